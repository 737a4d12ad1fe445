//! Entry point for the tunnel relay: parse CLI args, load configuration,
//! install logging, and run the supervisor until shutdown.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use relay_core::config::Config;
use relay_core::Supervisor;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the relay's TOML configuration file.
    #[arg(short, long, default_value = "./config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from(config.log_level.as_tracing_level()).into())
                .from_env_lossy(),
        )
        .init();

    tracing::info!(mode = ?config.mode, "starting relay");

    let supervisor = Supervisor::start(&config)
        .await
        .context("failed to start relay pipeline")?;

    supervisor.run_until_shutdown().await
}
