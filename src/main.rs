//! Noughts - networked tic-tac-toe client.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use noughts::cli::{Cli, Command};
use noughts::{RestClient, SessionClient, SyncConfig, tui};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Create { server_url } => run_create(server_url).await,
        Command::Join { game_id, server_url } => run_join(game_id, server_url).await,
    }
}

/// Create a new game and play it in the TUI.
async fn run_create(server_url: String) -> Result<()> {
    init_logging()?;
    info!(server_url = %server_url, "Creating new game");

    let api = RestClient::new(server_url);
    let mut client = SessionClient::create(api, SyncConfig::default()).await?;
    info!(game_id = %client.game_id(), "Game created, waiting for opponent");

    client.open_push();
    tui::run(client).await
}

/// Join an existing game and play it in the TUI.
async fn run_join(game_id: String, server_url: String) -> Result<()> {
    init_logging()?;
    info!(server_url = %server_url, game_id = %game_id, "Joining game");

    let api = RestClient::new(server_url);
    let mut client = SessionClient::join(api, SyncConfig::default(), &game_id).await?;
    info!(game_id = %client.game_id(), "Joined game");

    client.open_push();
    tui::run(client).await
}

/// Logging goes to a file so it does not interfere with the TUI.
fn init_logging() -> Result<()> {
    let log_file = std::fs::File::create("noughts.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init(); // Don't panic if already initialized
    Ok(())
}
