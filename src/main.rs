//! heartrisk: Heart-disease risk inference service.
//!
//! Loads the artifact set once, then serves `/predict` until Ctrl-C.

use anyhow::{Context, Result};

use heartrisk::config::{LogConfig, ServiceConfig};
use heartrisk::logging::{self, Role};
use heartrisk::server;

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = logging::init(&LogConfig::from_env()?, Role::Server)
        .context("failed to initialise logging")?;

    tracing::info!("Starting heartrisk...");

    let config = ServiceConfig::from_env()?;
    server::run(config).await.context("server error")?;

    tracing::info!("heartrisk shutdown complete.");
    Ok(())
}
