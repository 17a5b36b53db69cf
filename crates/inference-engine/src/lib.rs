//! Flight Delay Inference Engine
//!
//! Gradient-boosted tree classifier plus the pipeline that feeds it flight
//! records for training and prediction.

mod classifier;
mod gbdt;
mod pipeline;

pub use classifier::DelayClassifier;
pub use gbdt::{Booster, BoosterParams, Tree};
pub use pipeline::{DelayModel, Preprocessed, DEFAULT_TARGET_COLUMN};

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during training or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model must be fitted before making predictions")]
    NotFitted,
    #[error("Training data needs both classes: {negatives} negative, {positives} positive")]
    ImbalancedTrainingData { negatives: usize, positives: usize },
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid label {value} at row {index}; labels must be 0 or 1")]
    InvalidLabel { index: usize, value: u8 },
    #[error("Invalid booster parameter: {0}")]
    InvalidParameter(String),
    #[error("Feature extraction failed: {0}")]
    Feature(#[from] FeatureError),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
