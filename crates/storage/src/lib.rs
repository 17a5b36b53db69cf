//! Storage Layer
//!
//! Loads historical flight records used to fit the delay model.

mod dataset;

pub use dataset::FlightDataset;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset {0} contains no records")]
    Empty(String),
}
