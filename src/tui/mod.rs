//! Terminal user interface built on ratatui
//!
//! Hosts the dialog stack over a showcase screen and a docs viewer.

pub mod app;
pub mod components;
pub mod events;
pub mod theme;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::config::Config;
use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use tracing::info;

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    reset_terminal()?;
    terminal.show_cursor()?;
    Ok(())
}

/// Leave raw mode and the alternate screen without a terminal handle.
///
/// Used from the panic hook, where the `Terminal` is out of reach.
pub fn reset_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

/// Main TUI entry point
pub async fn run(config: Config) -> Result<()> {
    let tick_interval = config.tick_interval();
    let mut app = App::new(config)?;

    let mut terminal = init_terminal()?;
    let mut event_handler = EventHandler::new(tick_interval);
    info!("Showcase started");

    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    restore_terminal(&mut terminal)?;
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next().await?;
        if app.handle_event(event).await? {
            break;
        }
    }
    Ok(())
}
