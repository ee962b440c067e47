//! Terminal UI: a thin client over the synchronization layer.
//!
//! Renders whatever the latest snapshot says and forwards key presses as
//! moves. No outcome or turn logic lives here; the view-model decides what
//! to display and whether a move is worth sending.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Alignment,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{info, warn};

use crate::snapshot::{GameSnapshot, Position};
use crate::sync::{LinkState, SessionClient, SyncState};
use crate::transport::GameApi;
use crate::view::SessionView;

/// Runs the TUI for one session until the user quits. Shuts the session
/// down on exit.
pub async fn run<A: GameApi>(mut client: SessionClient<A>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_session(&mut terminal, &mut client).await;

    client.shutdown();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        eprintln!("Error: {err:?}");
    }
    res
}

async fn run_session<B: ratatui::backend::Backend, A: GameApi>(
    terminal: &mut Terminal<B>,
    client: &mut SessionClient<A>,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    let rx = client.subscribe();
    let mut notice: Option<String> = None;

    loop {
        let state = rx.borrow().clone();
        let view = SessionView::derive(state.session.as_ref(), Some(client.my_mark()));

        terminal.draw(|f| draw(f, &state, &view, notice.as_deref()))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => {
                        info!("user quit");
                        return Ok(());
                    }
                    KeyCode::Char(c) if c.is_ascii_digit() => {
                        let Some(digit) = c.to_digit(10) else { continue };
                        if digit == 0 || !view.is_my_turn {
                            continue;
                        }
                        let Some(position) = Position::from_index(digit as usize - 1) else {
                            continue;
                        };
                        match client.submit_move(position).await {
                            Ok(()) => notice = None,
                            Err(error) => {
                                warn!(%error, "move not accepted");
                                notice = Some(error.to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

fn draw(frame: &mut Frame, state: &SyncState, view: &SessionView, notice: Option<&str>) {
    let board_text = match &state.session {
        Some(snapshot) => format_board(snapshot),
        None => "Connecting...".to_string(),
    };

    let mut lines = vec![view.status_line.clone(), String::new(), board_text, String::new()];
    if let Some(notice) = notice {
        lines.push(format!("Move rejected: {notice}"));
    }
    if let Some(error) = &state.error {
        lines.push(format!("Sync error: {error} (showing last known state)"));
    }
    if state.link == LinkState::Lost {
        lines.push("Live updates unavailable - polling only".to_string());
    }
    lines.push("Press 1-9 to move, 'q' to quit".to_string());

    let paragraph = Paragraph::new(lines.join("\n"))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(Block::default().title("Tic-Tac-Toe").borders(Borders::ALL));

    frame.render_widget(paragraph, frame.area());
}

/// Formats the board grid, numbering empty cells 1-9 to match the key map.
fn format_board(snapshot: &GameSnapshot) -> String {
    let mut result = String::new();
    for (row, cells) in snapshot.board.iter().enumerate() {
        if row > 0 {
            result.push_str("\n-----------\n");
        }
        for (col, cell) in cells.iter().enumerate() {
            if col > 0 {
                result.push('|');
            }
            match cell {
                Some(mark) => result.push_str(&format!(" {mark} ")),
                None => result.push_str(&format!(" {} ", row * cells.len() + col + 1)),
            }
        }
    }
    result
}
