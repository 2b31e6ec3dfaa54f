mod config;
mod logging;
mod runner;

use std::path::PathBuf;

use anyhow::Context;
use scout_logging::scout_info;

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let loaded = AppConfig::load(&config_path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    logging::initialize(
        config.log_destination,
        scout_logging::parse_level(&config.log_level),
    );
    if !found {
        scout_info!("no config at {:?}; using defaults", config_path);
    }
    scout_info!(
        "scout starting: {} providers, {} batches, width {}",
        config.providers.len(),
        config.batches.len(),
        config.width
    );

    let summaries = runner::run(&config).await?;
    let json = serde_json::to_string_pretty(&summaries).context("serializing run summaries")?;
    println!("{json}");
    Ok(())
}
