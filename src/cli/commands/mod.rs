//! CLI parser and command dispatch.

mod classify;
mod config_cmd;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;

pub use scrape::ScrapeArgs;

#[derive(Parser)]
#[command(name = "wod")]
#[command(about = "Harvest classified workout records from the wodwell listing")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check for the verbose flag before clap runs, so logging can be set up first.
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the listing and append records to a JSON-lines file
    Scrape(ScrapeArgs),

    /// Classify a score-type markup fragment
    Classify {
        /// Markup fragment, e.g. '<div class="wod-score-type">For Time</div>'
        fragment: String,
    },

    /// Show the effective configuration
    Config,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut settings, config) = load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Scrape(args) => {
            args.apply_to_settings(&mut settings);
            scrape::cmd_scrape(&settings, &config).await
        }
        Commands::Classify { fragment } => classify::cmd_classify(&fragment),
        Commands::Config => config_cmd::cmd_config_show(&settings, &config),
    }
}
