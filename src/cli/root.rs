use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use super::listing::ListingArgs;
use super::run::RunCommand;
use crate::config::ListingConfig;
use crate::tui;

/// pagewalk - page through long listings without losing your place
#[derive(Parser, Debug)]
#[command(
    name = "pagewalk",
    version,
    about = "Page through long listings without losing your place",
    long_about = r#"pagewalk loads a listing one page at a time from a query index or a
built-in demo listing and renders ellipsis-windowed pagination controls.

Examples:
  pagewalk                                      # Browse the demo listing
  pagewalk browse -e https://host/query-index.json
  pagewalk run --goto 3 --goto 5                # Overlapping navigations, printed"#
)]
pub struct Cli {
    /// Configuration file to use instead of the default locations
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue navigations non-interactively and print what happened
    Run(RunCommand),

    /// Browse a listing in the terminal
    Browse(ListingArgs),
}

impl Cli {
    /// Log filter implied by the command line
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "pagewalk=debug"
        } else {
            "pagewalk=info"
        }
    }

    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let config = ListingConfig::init(self.config.as_deref()).await?;
        debug!("Configuration initialized");

        match self.command {
            Some(Commands::Run(run_cmd)) => run_cmd.execute(config).await,
            Some(Commands::Browse(args)) => Self::start_browser(config, &args).await,
            None => Self::start_browser(config, &ListingArgs::default()).await,
        }
    }

    async fn start_browser(mut config: ListingConfig, args: &ListingArgs) -> Result<()> {
        args.apply(&mut config);
        config.validate()?;

        info!("Starting interactive browser");
        tui::run(&config).await?;
        info!("Browser closed");
        Ok(())
    }
}
