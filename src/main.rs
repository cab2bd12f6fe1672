use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use chatshell::config::Config;
use cli::Cli;

#[tokio::main]
async fn main() {
    // Set up panic hook for graceful error recovery
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        error!("Application panicked: {}", panic_info);
        eprintln!("chatshell panicked: {}", panic_info);
        std::process::exit(1);
    }));

    // Load environment variables from .env file; a missing file is fine
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Configuration decides the log filter, so it loads before logging
    let config = match Config::init(cli.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&cli.default_log_filter(&config)) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = dotenv {
        tracing::debug!("No .env file found or error loading it: {}", e);
    }

    if let Err(e) = cli.execute(config).await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(default_filter: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
