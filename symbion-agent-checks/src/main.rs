//! Symbion Agent Checks - periodic checks runner
//!
//! Loads the agent configuration, discovers the host, initializes every
//! registered check once and runs them on a fixed interval until Ctrl-C.

use anyhow::{Context, Result};
use symbion_agent_checks::checks;
use symbion_agent_checks::runner::CheckRunner;
use symbion_agent_checks::{AgentConfig, SystemInfo};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // .env optionnel
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Symbion agent checks starting...");

    let config = AgentConfig::load().await.context("Failed to load agent configuration")?;
    let system_info = SystemInfo::discover();

    let mut runner = CheckRunner::new(config, system_info, checks::all());
    runner.init().await;
    runner.run_forever().await;

    Ok(())
}
