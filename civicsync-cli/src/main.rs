mod commands;
mod render;
mod scrape;
mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use civicsync_core::config::SyncConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "civicsync")]
#[command(about = "Mirror a municipal meetings calendar into your own calendar")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with the configured provider
    Auth,
    /// Scrape the meetings calendar and print or save the results
    Scrape {
        /// Save the scraped meetings as JSON instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show what a sync would change, without changing anything
    Status {
        /// Use meetings saved by `civicsync scrape --output` instead of scraping
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// List every change even when there are many
        #[arg(short, long)]
        verbose: bool,
    },
    /// Create, update and delete calendar events to match the meetings calendar
    Sync {
        /// Use meetings saved by `civicsync scrape --output` instead of scraping
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// List every change even when there are many
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show configuration paths and effective settings
    Config {
        /// Write a commented default config file
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Lets an existing `.env` provide GOOGLE_CALENDAR_ID and CIVICSYNC_* values
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Auth => commands::auth::run(&load_config()?).await,
        Commands::Scrape { output } => commands::scrape::run(&load_config()?, output).await,
        Commands::Status { from_file, verbose } => {
            commands::status::run(&load_config()?, from_file.as_deref(), verbose).await
        }
        Commands::Sync { from_file, verbose } => {
            commands::sync::run(&load_config()?, from_file.as_deref(), verbose).await
        }
        Commands::Config { init } => commands::config::run(init),
    }
}

fn load_config() -> Result<SyncConfig> {
    SyncConfig::load().context("Failed to load configuration")
}
