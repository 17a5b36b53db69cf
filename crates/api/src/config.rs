//! Service configuration

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file read when `DELAY_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "delay-service.toml";

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "DELAY_CONFIG";

/// Service configuration.
///
/// Layered as defaults, then the optional config file, then `DELAY_*`
/// environment variables (e.g. `DELAY_BIND_ADDR`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Socket address the HTTP server binds to
    pub bind_addr: String,

    /// CSV of historical flights the model is fitted on at startup
    pub data_path: PathBuf,

    /// Log filter directive when `RUST_LOG` is unset
    pub log_level: String,

    /// Emit JSON log lines instead of plain text
    pub log_json: bool,

    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            data_path: PathBuf::from("data/data.csv"),
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

impl ServiceConfig {
    /// Load from `DELAY_CONFIG` (or the default file) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file; a missing file falls back to defaults
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("DELAY").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
