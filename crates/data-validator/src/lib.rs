//! Flight Data Validation
//!
//! Checks airline, flight type and month against the categories the delay
//! model knows about. The feature encoder itself is permissive, so this is
//! the only place a bad request gets rejected.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Validator, ValidationConfig, ValidationResult, KNOWN_AIRLINES};
