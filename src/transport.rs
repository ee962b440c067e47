//! HTTP transport to the game server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::ClientError;
use crate::snapshot::{GameSnapshot, Position};

/// Request/response surface of the game server.
///
/// The trait exists so the synchronization loop can be exercised against a
/// scripted implementation in tests; `RestClient` is the production one.
#[async_trait]
pub trait GameApi: Send + Sync + 'static {
    /// Creates a new game. The response carries the assigned identity and
    /// `player_count = 1`.
    async fn create_game(&self) -> Result<GameSnapshot, ClientError>;

    /// Joins an existing game by id. Fails with [`ClientError::NotFound`] if
    /// no such game exists and [`ClientError::Conflict`] if it is full.
    async fn join_game(&self, game_id: &str) -> Result<GameSnapshot, ClientError>;

    /// Submits a move and returns the new authoritative state. A rejection
    /// surfaces as [`ClientError::IllegalMove`] with the server's reason.
    async fn submit_move(
        &self,
        game_id: &str,
        player_id: &str,
        position: Position,
    ) -> Result<GameSnapshot, ClientError>;

    /// Fetches the current state without mutating anything server-side.
    async fn fetch_state(&self, game_id: &str) -> Result<GameSnapshot, ClientError>;

    /// WebSocket endpoint streaming snapshots for the given game.
    fn push_url(&self, game_id: &str) -> String;
}

/// Move request body.
#[derive(Debug, Serialize)]
struct MoveBody<'a> {
    player_id: &'a str,
    position: Position,
}

/// Structured error payload the server wraps in non-success responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// REST client for the game server.
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestClient {
    /// Creates a client against the given base URL (e.g.
    /// `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    async fn decode_snapshot(response: reqwest::Response) -> Result<GameSnapshot, ClientError> {
        let status = response.status().as_u16();
        response.json::<GameSnapshot>().await.map_err(|err| {
            warn!(error = %err, "failed to decode game snapshot");
            ClientError::Server {
                status,
                message: "malformed game snapshot".to_string(),
            }
        })
    }

    /// Reads the status and (best-effort) structured detail of an error
    /// response. The body may be anything on proxy or transport-level
    /// failures, so decode failures degrade to `None`.
    async fn read_error(response: reqwest::Response) -> (u16, Option<ErrorDetail>) {
        let status = response.status().as_u16();
        let detail = response.json::<ErrorBody>().await.ok().map(|body| body.detail);
        debug!(status, ?detail, "server returned error response");
        (status, detail)
    }

    fn server_error(status: u16, detail: Option<ErrorDetail>) -> ClientError {
        ClientError::Server {
            status,
            message: detail
                .map(|d| d.message)
                .unwrap_or_else(|| "unexpected response".to_string()),
        }
    }
}

#[async_trait]
impl GameApi for RestClient {
    #[instrument(skip(self))]
    async fn create_game(&self) -> Result<GameSnapshot, ClientError> {
        info!("Creating game on server");
        let response = self
            .client
            .post(format!("{}/games", self.base_url))
            .send()
            .await?;

        if response.status().is_success() {
            return Self::decode_snapshot(response).await;
        }
        let (status, detail) = Self::read_error(response).await;
        Err(Self::server_error(status, detail))
    }

    #[instrument(skip(self))]
    async fn join_game(&self, game_id: &str) -> Result<GameSnapshot, ClientError> {
        info!("Joining game");
        let response = self
            .client
            .post(format!("{}/games/{}/join", self.base_url, game_id))
            .send()
            .await?;

        if response.status().is_success() {
            return Self::decode_snapshot(response).await;
        }
        let (status, detail) = Self::read_error(response).await;
        Err(match detail {
            Some(d) if d.code == "GAME_NOT_FOUND" => ClientError::NotFound,
            Some(d) if d.code == "GAME_RULE_VIOLATION" => ClientError::Conflict,
            _ if status == 404 => ClientError::NotFound,
            other => Self::server_error(status, other),
        })
    }

    #[instrument(skip(self), fields(position = %position))]
    async fn submit_move(
        &self,
        game_id: &str,
        player_id: &str,
        position: Position,
    ) -> Result<GameSnapshot, ClientError> {
        info!("Sending move to server");
        let body = MoveBody { player_id, position };
        let response = self
            .client
            .post(format!("{}/games/{}/move", self.base_url, game_id))
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            return Self::decode_snapshot(response).await;
        }
        let (status, detail) = Self::read_error(response).await;
        Err(match detail {
            Some(d) if d.code == "GAME_NOT_FOUND" => ClientError::NotFound,
            Some(d) if d.code == "GAME_RULE_VIOLATION" || d.code == "INVALID_POSITION" => {
                warn!(reason = %d.message, "move rejected");
                ClientError::IllegalMove(d.message)
            }
            _ if status == 404 => ClientError::NotFound,
            other => Self::server_error(status, other),
        })
    }

    #[instrument(skip(self))]
    async fn fetch_state(&self, game_id: &str) -> Result<GameSnapshot, ClientError> {
        debug!("Fetching game state");
        let response = self
            .client
            .get(format!("{}/games/{}", self.base_url, game_id))
            .send()
            .await?;

        if response.status().is_success() {
            return Self::decode_snapshot(response).await;
        }
        let (status, detail) = Self::read_error(response).await;
        Err(match detail {
            Some(d) if d.code == "GAME_NOT_FOUND" => ClientError::NotFound,
            _ if status == 404 => ClientError::NotFound,
            other => Self::server_error(status, other),
        })
    }

    fn push_url(&self, game_id: &str) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{ws_base}/games/{game_id}/ws")
    }
}
