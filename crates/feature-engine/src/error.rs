//! Feature Extraction Error Types

use thiserror::Error;

/// Errors during feature extraction
///
/// Both variants are timestamp parse failures. They are kept apart so the
/// caller can tell a broken input from a time the period buckets don't cover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// Timestamp is not in `YYYY-MM-DD HH:MM:SS` form
    #[error("Malformed timestamp '{input}': {reason}")]
    MalformedTimestamp { input: String, reason: String },

    /// Time of day sits on a period-of-day boundary and matches no bucket
    #[error("Timestamp '{input}' falls on a period-of-day boundary")]
    BoundaryTime { input: String },
}
