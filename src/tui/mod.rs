//! Keyboard focus layer of the shell
//!
//! `dom` holds the element tree and key dispatch, `components` the rail,
//! dialogs and shell views built on it, and `app` ties them together.

pub mod app;
pub mod components;
pub mod dom;
pub mod events;
pub mod keys;
pub mod view;

pub use app::App;
pub use events::{Event, EventHandler};
pub use keys::KeyMap;

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main application loop: draw, wait for an event, hand it to the app
pub async fn run_app(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| view::render(frame, app))?;

        let event = event_handler.next().await?;
        if app.handle_event(event)? {
            break;
        }
    }
    Ok(())
}
