//! Wire data model shared with the game server.
//!
//! Everything here mirrors the server's JSON exactly. The client never
//! derives `current_turn`, `winner`, or `status` itself; each snapshot is an
//! authoritative total replacement for the previous one.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Unique identifier for a game, assigned by the server.
pub type GameId = String;

/// Unique identifier for a player within a game, assigned by the server.
pub type PlayerId = String;

/// Mark placed on the board. X always belongs to the game's creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// Mark X (moves first).
    X,
    /// Mark O.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// Lifecycle phase of a game as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// One player present, waiting for an opponent to join.
    Waiting,
    /// Both players present, moves being exchanged.
    InProgress,
    /// Game over; `winner` distinguishes win from draw.
    Finished,
}

/// A board coordinate, `(row, col)`, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position(pub usize, pub usize);

impl Position {
    /// Row of this position.
    pub fn row(self) -> usize {
        self.0
    }

    /// Column of this position.
    pub fn col(self) -> usize {
        self.1
    }

    /// Converts a flat board index (0-8, row-major) into a position.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < 9 {
            Some(Position(index / 3, index % 3))
        } else {
            None
        }
    }

    /// Converts this position into a flat board index (row-major).
    pub fn to_index(self) -> usize {
        self.0 * 3 + self.1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Authoritative game state as last observed by this client.
///
/// The board dimensions are server-defined (3x3 in practice); the client
/// renders whatever grid it receives and does not validate its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Identifier of the game, stable for its lifetime.
    pub game_id: GameId,
    /// Identity echoed by create/join responses; absent on plain fetches.
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    /// The grid of cells.
    pub board: Vec<Vec<Option<Mark>>>,
    /// Which mark moves next; absent before two players joined.
    #[serde(default)]
    pub current_turn: Option<Mark>,
    /// Lifecycle phase.
    pub status: GameStatus,
    /// Winning mark when finished; `None` on a finished game means draw.
    #[serde(default)]
    pub winner: Option<Mark>,
    /// Number of players currently in the game (0-2).
    pub player_count: u8,
}

impl GameSnapshot {
    /// Returns the mark at `(row, col)`, if the cell exists and is occupied.
    pub fn cell(&self, row: usize, col: usize) -> Option<Mark> {
        self.board.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// True once the server reports the game over.
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }
}

static GAME_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Checks a game id against the canonical 36-character hyphenated
/// hexadecimal format before any join request is issued.
pub fn game_id_is_valid(id: &str) -> bool {
    let pattern = GAME_ID_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("game id pattern is valid")
    });
    pattern.is_match(id)
}
