//! Flight Delay Service - Main Entry Point

use anyhow::{anyhow, Context};
use api::{fit_from_csv, init_logging, init_metrics, run_server, AppState, ServiceConfig};
use inference_engine::DelayModel;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("Failed to load configuration")?;
    init_logging(&config).map_err(|e| anyhow!(e))?;

    info!("=== Flight Delay Service v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = if config.metrics_enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let model = Arc::new(DelayModel::new());
    let trained_on = fit_from_csv(&model, &config.data_path).await?;
    info!("Delay model ready ({} training records)", trained_on);

    let state = Arc::new(AppState::new(model, metrics));
    run_server(&config.bind_addr, state).await
}
