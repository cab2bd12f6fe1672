use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use super::interactive::InteractiveCommand;
use super::replay::ReplayCommand;
use chatshell::config::Config;

/// chatshell - keyboard focus core of a chat-assistant shell
#[derive(Parser)]
#[command(
    name = "chatshell",
    version,
    about = "Keyboard focus core of a chat-assistant shell",
    long_about = r#"Drives the shell's focus layer: modal dialogs that trap Tab and hand focus
back on close, and a sidebar rail navigated with the arrow keys.

Examples:
  chatshell replay scenarios/settings.yaml   # Replay a scripted key sequence
  chatshell interactive                      # Drive the shell from the keyboard
  chatshell --config ./chatshell.json replay flow.json"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Configuration file (JSON or YAML)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a scenario file against the shell
    Replay(ReplayCommand),
    /// Drive the shell from the terminal
    Interactive(InteractiveCommand),
}

impl Cli {
    /// Default log filter when `RUST_LOG` is unset
    pub fn default_log_filter(&self, config: &Config) -> String {
        if self.debug {
            return "chatshell=debug".to_string();
        }
        config
            .log_filter
            .clone()
            .unwrap_or_else(|| "chatshell=info".to_string())
    }

    pub async fn execute(self, config: Config) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        match self.command {
            Commands::Replay(cmd) => cmd.execute(&config).await,
            Commands::Interactive(cmd) => cmd.execute(&config).await,
        }
    }
}
