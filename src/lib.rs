//! Noughts - a thin client for networked tic-tac-toe.
//!
//! The client keeps a local copy of the authoritative server state through
//! two cooperating sources: a fixed-period polling loop and a WebSocket push
//! channel with exponential-backoff reconnection. Every update replaces the
//! session wholesale; all game rules (turn legality, win detection) live on
//! the server, and this crate only transports moves and renders whatever
//! state comes back.
//!
//! # Architecture
//!
//! - **Transport**: [`GameApi`] request/response calls plus the push channel
//! - **Reconnection**: [`ReconnectPolicy`] backoff schedule for the channel
//! - **Synchronization**: [`SessionClient`] polling loop and state fan-out
//! - **View-model**: [`SessionView`] derived facts for the presentation layer
//!
//! # Example
//!
//! ```no_run
//! use noughts::{RestClient, SessionClient, SyncConfig};
//!
//! # async fn example() -> Result<(), noughts::ClientError> {
//! let api = RestClient::new("http://localhost:8000/api");
//! let mut client = SessionClient::create(api, SyncConfig::default()).await?;
//! client.open_push();
//! println!("Share this game ID: {}", client.game_id());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod error;
mod push;
mod reconnect;
mod snapshot;
mod sync;
mod transport;
mod view;

// Presentation layer (binary glue)
pub mod cli;
pub mod tui;

// Crate-level exports - errors
pub use error::ClientError;

// Crate-level exports - reconnection policy
pub use reconnect::ReconnectPolicy;

// Crate-level exports - wire data model
pub use snapshot::{GameId, GameSnapshot, GameStatus, Mark, PlayerId, Position, game_id_is_valid};

// Crate-level exports - synchronization
pub use sync::{Generation, LinkState, SessionClient, SyncConfig, SyncState};

// Crate-level exports - transport
pub use transport::{GameApi, RestClient};

// Crate-level exports - view-model
pub use view::{SessionView, is_my_turn, status_line};
