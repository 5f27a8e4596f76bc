//! Librato metric management CLI.

use anyhow::{Context, Result};
use clap::Parser;
use librato::cli::{Cli, Commands, handle_metric_command};
use librato::{LibratoClient, LogFormat, MetricResourceManager, Reconciler, init_tracing};
use std::str::FromStr;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads env-backed flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let format = LogFormat::from_str(&cli.log_format)
        .with_context(|| format!("Unknown log format '{}'", cli.log_format))?;
    init_tracing("info", format).map_err(anyhow::Error::msg)?;

    info!("Starting librato");

    let client = LibratoClient::from_config(cli.config.as_deref())?;
    debug!(base_url = %client.base_url(), "Client configured");

    let settle = cli.settle.strategy();
    debug!(?settle, "Settling strategy");
    let reconciler = Reconciler::new(MetricResourceManager::new(client), settle);

    match cli.command {
        Commands::Metric(command) => handle_metric_command(command, &reconciler).await,
    }
}
