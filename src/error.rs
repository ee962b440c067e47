//! Client error taxonomy.

use derive_more::{Display, Error};

/// Errors surfaced by the transport and synchronization layers.
///
/// Create/join/move failures surface to the caller without touching the
/// locally held session. Fetch failures inside the synchronization loop are
/// reported as transient and leave the last good session in place.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ClientError {
    /// The server could not be reached (connection, DNS, timeout).
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),

    /// The server answered with a non-success response carrying no usable
    /// structured detail, or with a body the client could not decode.
    #[display("server error: {message} (status {status})")]
    Server {
        /// HTTP status code of the response.
        status: u16,
        /// Short description of what went wrong.
        message: String,
    },

    /// The server rejected a move; carries the server-supplied reason.
    #[display("illegal move: {_0}")]
    IllegalMove(#[error(not(source))] String),

    /// No game exists under the given id.
    #[display("game not found")]
    NotFound,

    /// The game already has two players.
    #[display("game is full")]
    Conflict,

    /// The game id failed local validation; no request was issued.
    #[display("invalid game id")]
    InvalidGameId,
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}
