//! farescout - flight-fare scraping worker.
//!
//! Main entry point: loads configuration, wires the coordinator client,
//! airline handlers, and browser scrape handler into a [`JobWorker`], and
//! runs the polling loop until its error budget is exhausted.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use farescout_coordinator::{Coordinator, CoordinatorClient};
use farescout_sources::{RyanairClient, WizzairClient};
use farescout_worker::{
    BrowserScrape, Dispatcher, JobHandler, JobWorker, RyanairJobs, WizzairJobs,
};

use crate::config::{Airline, Config};

/// farescout CLI.
#[derive(Parser)]
#[command(name = "farescout")]
#[command(about = "Flight-fare scraping worker")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn build_api_handler(
    config: &Config,
    coordinator: Arc<dyn Coordinator>,
) -> Result<Box<dyn JobHandler>, Box<dyn std::error::Error>> {
    match config.sources.airline {
        Airline::Ryanair => Ok(Box::new(RyanairJobs::new(
            coordinator,
            RyanairClient::new()?,
        ))),
        Airline::Wizzair => {
            let mut client = WizzairClient::new(config.sources.wizzair.challenge.clone())?;
            if let Some(version) = &config.sources.wizzair.api_version {
                client = client.api_version(version.clone());
            }
            Ok(Box::new(WizzairJobs::new(coordinator, client)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = config::load(&cli.config)?;
    info!(config = %cli.config.display(), "configuration loaded");

    let coordinator: Arc<dyn Coordinator> =
        Arc::new(CoordinatorClient::new(config.coordinator.base_url.clone())?);

    let api = build_api_handler(&config, coordinator.clone())?;
    let browser = BrowserScrape::new(coordinator.clone(), config.browser.clone());
    let handler = Arc::new(Dispatcher::new(api, browser));

    let worker = JobWorker::new(coordinator, handler, config.worker.clone());
    worker.run().await;

    info!("worker finished");
    Ok(())
}
