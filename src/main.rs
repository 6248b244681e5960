use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use toldo::cli::Cli;
use toldo::tui;

#[tokio::main]
async fn main() {
    // Restore the terminal before reporting, or the message lands in the alternate screen
    std::panic::set_hook(Box::new(|panic_info| {
        let _ = tui::reset_terminal();
        error!("Application panicked: {}", panic_info);
        eprintln!("{}", panic_info);
        std::process::exit(1);
    }));

    // Load environment variables from .env file
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.debug) {
        eprintln!("Failed to initialize logging: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = dotenv {
        tracing::debug!("No .env file found or error loading it: {}", e);
    }

    if let Err(e) = cli.execute().await {
        error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) -> Result<()> {
    let default_filter = if debug { "toldo=debug" } else { "toldo=info" };
    let env_filter = if debug {
        EnvFilter::new(default_filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
    };

    // The showcase owns the terminal, so logs can be sent to a file instead
    match std::env::var("TOLDO_LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
        }
    }

    Ok(())
}
