//! siteaudit operator CLI.
//!
//! Runs against the same cache directory and KV store as the server, so it can
//! inspect, warm or clean a live deployment. Results are printed as JSON on
//! stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use siteaudit_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "siteaudit")]
#[command(about = "Website audit cache operations", version)]
struct Cli {
    /// Override the filesystem cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch an audit through the cache tiers
    Get {
        url: String,

        /// Regenerate regardless of cache state
        #[arg(long)]
        refresh: bool,
    },

    /// Remove an audit from every tier
    Invalidate { url: String },

    /// Run the memory and filesystem sweeps once
    Sweep,

    /// Print tier statistics
    Stats,

    /// Print the shareable report id for a URL
    ReportId { url: String },

    /// Read SEO metadata and technologies from a saved HTML page
    Inspect { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }

    let output = commands::run(cli.command, &config).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
