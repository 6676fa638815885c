//! TrailSentry - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use detection::{AnomalyDetector, DetectorService};
use storage::Repository;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== TrailSentry v{} ===", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().context("failed to load configuration")?;
    let repository = Repository::connect(&config.database.url)
        .await
        .context("failed to open database")?;

    let detector = AnomalyDetector::new(repository.clone(), config.detector.clone());
    let service = DetectorService::start(detector);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    run_server(&addr, repository)
        .await
        .context("server error")?;

    // let the in-flight detection cycle finish before exiting
    service.stop().await;

    Ok(())
}
