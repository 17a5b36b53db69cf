//! Validation Error Types

use thiserror::Error;

/// Errors during flight validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Airline not in the whitelist
    #[error("Unknown airline: {0}")]
    UnknownAirline(String),

    /// Flight type other than the accepted codes
    #[error("Unknown flight type: {0}")]
    UnknownFlightType(String),

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}
