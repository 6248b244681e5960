use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::{DocsCommand, LayoutCommand};
use crate::config::Config;
use crate::tui;

/// Toldo - stacked dialogs for the terminal
#[derive(Parser)]
#[command(
    name = "toldo",
    version,
    about = "Stacked dialogs for the terminal",
    long_about = r#"Toldo keeps a registry of named dialogs and draws the open ones as an animated stack.
Without a subcommand it starts the interactive showcase.

Examples:
  toldo                              # Start the showcase
  toldo docs stacked                 # Print a documentation page
  toldo layout --open a,b,c          # Print the stack layout as JSON"#
)]
pub struct Cli {
    /// Config file to use instead of the default lookup
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a rendered documentation page
    Docs(DocsCommand),

    /// Compute the stack layout for a set of open dialogs
    Layout(LayoutCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let config = Config::init(self.config.as_deref()).await?;
        debug!("Configuration initialized");

        match self.command {
            Some(Commands::Docs(docs_cmd)) => docs_cmd.execute(&config),
            Some(Commands::Layout(layout_cmd)) => layout_cmd.execute(&config),
            None => {
                info!("Starting interactive mode");
                tui::run(config).await?;
                info!("Application finished");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["toldo", "--debug", "--config", "custom.json"]).unwrap();
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("custom.json")));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["toldo", "docs", "api", "--width", "60"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Docs(ref d)) if d.page.as_deref() == Some("api") && d.width == 60));

        let cli = Cli::try_parse_from(["toldo", "layout", "--open", "a,b", "-d"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::Layout(ref l)) if l.open.len() == 2));
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["toldo", "serve"]).is_err());
    }
}
