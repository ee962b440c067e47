//! Command-line interface for noughts.

use clap::{Parser, Subcommand};

/// Noughts - thin client for networked tic-tac-toe
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Play tic-tac-toe against a remote opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new game and wait for an opponent
    Create {
        /// Base URL of the game server
        #[arg(long, default_value = "http://localhost:8000/api")]
        server_url: String,
    },

    /// Join an existing game by id
    Join {
        /// Id of the game to join (shared by its creator)
        game_id: String,

        /// Base URL of the game server
        #[arg(long, default_value = "http://localhost:8000/api")]
        server_url: String,
    },
}
