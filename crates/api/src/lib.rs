//! Flight Delay Prediction Service
//!
//! HTTP front end for the delay model: health check, batch prediction and
//! Prometheus metrics.

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use data_validator::Validator;
use inference_engine::DelayModel;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::FlightDataset;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod routes;

pub use config::ServiceConfig;
pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Delay model; fitted once before serving
    pub model: Arc<DelayModel>,
    /// Boundary validator for requested flights
    pub validator: Validator,
    /// Prometheus handle, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state around a model
    pub fn new(model: Arc<DelayModel>, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            model,
            validator: Validator::default(),
            metrics,
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::get_health))
        .route("/predict", post(routes::predict::post_predict))
        .route("/metrics", get(routes::metrics::get_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging; `RUST_LOG` overrides the configured level
pub fn init_logging(
    config: &ServiceConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// Load historical flights from `path` and fit the model on a blocking worker.
///
/// Returns the number of records trained on.
pub async fn fit_from_csv(model: &Arc<DelayModel>, path: &Path) -> anyhow::Result<usize> {
    let model = Arc::clone(model);
    let path: PathBuf = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
        let dataset = FlightDataset::from_csv(&path)
            .with_context(|| format!("Failed to load training data from {}", path.display()))?;
        model
            .train(dataset.records())
            .context("Failed to fit delay model")?;
        Ok(dataset.len())
    })
    .await
    .context("Training task panicked")?
}

/// Serve the router until Ctrl-C
pub async fn run_server(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
