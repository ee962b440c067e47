//! Derived presentation facts.
//!
//! Pure functions of the latest snapshot plus the locally stored mark; no
//! game logic, only re-phrasing what the server already decided.

use crate::snapshot::{GameSnapshot, GameStatus, Mark};

/// True iff both players are present, the game is running, and the server
/// says it is `my_mark`'s turn.
pub fn is_my_turn(snapshot: &GameSnapshot, my_mark: Mark) -> bool {
    snapshot.player_count == 2
        && snapshot.status == GameStatus::InProgress
        && snapshot.current_turn == Some(my_mark)
}

/// One-line status for the given snapshot from `my_mark`'s point of view.
pub fn status_line(snapshot: &GameSnapshot, my_mark: Mark) -> String {
    match snapshot.status {
        GameStatus::Finished => match snapshot.winner {
            Some(winner) if winner == my_mark => "You won!".to_string(),
            Some(_) => "You lost!".to_string(),
            None => "Game ended in a draw!".to_string(),
        },
        GameStatus::Waiting => format!(
            "Waiting for opponent - share this game ID: {} ({}/2 players)",
            snapshot.game_id, snapshot.player_count
        ),
        GameStatus::InProgress => {
            if is_my_turn(snapshot, my_mark) {
                "Your turn!".to_string()
            } else {
                "Opponent's turn".to_string()
            }
        }
    }
}

/// Read-only facts the presentation layer renders each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// Mark assigned to this client, if a session exists.
    pub my_mark: Option<Mark>,
    /// Whether a locally submitted move would currently be in turn.
    pub is_my_turn: bool,
    /// Human-readable session status.
    pub status_line: String,
}

impl SessionView {
    /// Derives the view from the latest snapshot and the stored mark.
    pub fn derive(session: Option<&GameSnapshot>, my_mark: Option<Mark>) -> Self {
        match (session, my_mark) {
            (Some(snapshot), Some(mark)) => SessionView {
                my_mark: Some(mark),
                is_my_turn: is_my_turn(snapshot, mark),
                status_line: status_line(snapshot, mark),
            },
            _ => SessionView {
                my_mark: None,
                is_my_turn: false,
                status_line: "No active game".to_string(),
            },
        }
    }
}
