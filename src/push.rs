//! WebSocket push channel.
//!
//! The server streams full snapshots, one JSON message each; the client
//! stays silent on this channel. The channel task applies snapshots in
//! arrival order and reconnects on its own with exponential backoff until
//! the policy's attempt ceiling is exhausted.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, instrument, warn};

use crate::reconnect::ReconnectPolicy;
use crate::snapshot::GameSnapshot;
use crate::sync::{Generation, LinkState, SyncState, apply_snapshot, set_link};

/// Runs one push channel until teardown or retry exhaustion.
///
/// The first dial happens immediately; every later one waits out the
/// policy's delay for its attempt number. A successful open resets the
/// attempt counter to zero.
#[instrument(skip(policy, generation, state))]
pub(crate) async fn run_push_channel(
    url: String,
    policy: ReconnectPolicy,
    generation: Generation,
    token: u64,
    state: Arc<watch::Sender<SyncState>>,
) {
    let mut attempt: u32 = 0;
    loop {
        if !generation.is_current(token) {
            return;
        }
        if attempt == 0 {
            set_link(&state, &generation, token, LinkState::Connecting);
        }

        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                info!("push channel connected");
                attempt = 0;
                set_link(&state, &generation, token, LinkState::Connected);
                read_snapshots(stream, &generation, token, &state).await;
                if !generation.is_current(token) {
                    return;
                }
                warn!("push channel dropped");
            }
            Err(error) => {
                warn!(%error, "push channel connect failed");
            }
        }

        attempt += 1;
        let Some(delay) = policy.delay(attempt) else {
            warn!(attempt, "push reconnect attempts exhausted, polling continues");
            set_link(&state, &generation, token, LinkState::Lost);
            return;
        };
        set_link(&state, &generation, token, LinkState::Reconnecting { attempt });
        debug!(attempt, ?delay, "push reconnect scheduled");
        tokio::time::sleep(delay).await;
    }
}

/// Reads messages until the connection closes or the session is superseded.
async fn read_snapshots(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    generation: &Generation,
    token: u64,
    state: &watch::Sender<SyncState>,
) {
    while let Some(message) = stream.next().await {
        if !generation.is_current(token) {
            return;
        }
        match message {
            Ok(Message::Text(text)) => match serde_json::from_str::<GameSnapshot>(&text) {
                Ok(snapshot) => {
                    debug!(status = ?snapshot.status, "applying pushed snapshot");
                    if !apply_snapshot(state, generation, token, snapshot) {
                        return;
                    }
                }
                Err(error) => {
                    warn!(%error, "ignoring malformed push message");
                }
            },
            Ok(Message::Close(_)) => {
                debug!("push channel received close frame");
                return;
            }
            Ok(_) => {
                // Ping/pong and binary frames carry no snapshots.
            }
            Err(error) => {
                warn!(%error, "push channel read failed");
                return;
            }
        }
    }
}
