use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use chatshell::config::Config;
use chatshell::tui::{self, App, EventHandler};

/// Drive the shell from the terminal
#[derive(Args)]
pub struct InteractiveCommand {
    /// Print the key bindings and exit
    #[arg(long = "keys")]
    pub keys: bool,
}

impl InteractiveCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let mut app = App::new(config.clone())?;

        if self.keys {
            println!("{}", app.key_map().help_text());
            return Ok(());
        }

        info!("Starting interactive mode");
        let mut terminal = tui::init_terminal()?;
        let mut event_handler = EventHandler::new();

        let result = tui::run_app(&mut terminal, &mut app, &mut event_handler).await;

        // Always give the terminal back, even when the loop failed
        tui::restore_terminal(&mut terminal)?;
        app.shutdown()?;
        debug!("Interactive session ended on {}", app.focus_label());
        result
    }
}
