//! Flight Field Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Airlines present in the historical training data
pub const KNOWN_AIRLINES: [&str; 23] = [
    "Aerolineas Argentinas",
    "Aeromexico",
    "Air Canada",
    "Air France",
    "Alitalia",
    "American Airlines",
    "Austral",
    "Avianca",
    "British Airways",
    "Copa Air",
    "Delta Air",
    "Gol Trans",
    "Grupo LATAM",
    "Iberia",
    "JetSmart SPA",
    "K.L.M.",
    "Lacsa",
    "Latin American Wings",
    "Oceanair Linhas Aereas",
    "Plus Ultra Lineas Aereas",
    "Qantas Airways",
    "Sky Airline",
    "United Airlines",
];

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Accepted `OPERA` values
    pub airlines: Vec<String>,
    /// Accepted `TIPOVUELO` codes
    pub flight_types: Vec<String>,
    /// Inclusive `MES` range
    pub month_range: (i64, i64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            airlines: KNOWN_AIRLINES.iter().map(|a| a.to_string()).collect(),
            flight_types: vec!["I".to_string(), "N".to_string()],
            month_range: (1, 12),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// First error, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Validator for requested flights
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate the airline against the whitelist
    pub fn validate_airline(&self, airline: &str) -> Result<(), ValidationError> {
        if self.config.airlines.iter().any(|a| a == airline) {
            Ok(())
        } else {
            Err(ValidationError::UnknownAirline(airline.to_string()))
        }
    }

    /// Validate the flight type code
    pub fn validate_flight_type(&self, flight_type: &str) -> Result<(), ValidationError> {
        if self.config.flight_types.iter().any(|t| t == flight_type) {
            Ok(())
        } else {
            Err(ValidationError::UnknownFlightType(flight_type.to_string()))
        }
    }

    /// Validate the month number
    pub fn validate_month(&self, month: i64) -> Result<(), ValidationError> {
        let (min, max) = self.config.month_range;
        if month < min || month > max {
            Err(ValidationError::OutOfRange {
                field: "MES",
                value: month,
                min,
                max,
            })
        } else {
            Ok(())
        }
    }

    /// Check every field of a flight and collect all failures
    pub fn validate_flight(
        &self,
        airline: &str,
        flight_type: &str,
        month: i64,
    ) -> ValidationResult {
        let errors: Vec<ValidationError> = [
            self.validate_airline(airline),
            self.validate_flight_type(flight_type),
            self.validate_month(month),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            ValidationResult::valid(3)
        } else {
            debug!("Flight rejected with {} error(s): {:?}", errors.len(), errors);
            ValidationResult::invalid(errors, 3)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_airlines() {
        let validator = Validator::default();
        assert!(validator.validate_airline("Grupo LATAM").is_ok());
        assert!(validator.validate_airline("K.L.M.").is_ok());
        assert_eq!(
            validator.validate_airline("Argentinas"),
            Err(ValidationError::UnknownAirline("Argentinas".to_string()))
        );
        assert!(validator.validate_airline("grupo latam").is_err());
    }

    #[test]
    fn test_flight_types() {
        let validator = Validator::default();
        assert!(validator.validate_flight_type("I").is_ok());
        assert!(validator.validate_flight_type("N").is_ok());
        assert!(validator.validate_flight_type("O").is_err());
        assert!(validator.validate_flight_type("").is_err());
    }

    #[test]
    fn test_month_range() {
        let validator = Validator::default();
        assert!(validator.validate_month(1).is_ok());
        assert!(validator.validate_month(12).is_ok());
        assert!(validator.validate_month(0).is_err());
        assert_eq!(
            validator.validate_month(13),
            Err(ValidationError::OutOfRange {
                field: "MES",
                value: 13,
                min: 1,
                max: 12,
            })
        );
    }

    #[test]
    fn test_validate_flight_collects_errors() {
        let validator = Validator::default();

        let ok = validator.validate_flight("Aerolineas Argentinas", "N", 3);
        assert!(ok.valid);
        assert_eq!(ok.fields_checked, 3);
        assert!(ok.into_result().is_ok());

        let bad = validator.validate_flight("Aerolineas Argentinas", "O", 13);
        assert!(!bad.valid);
        assert_eq!(bad.errors.len(), 2);
        assert_eq!(
            bad.into_result(),
            Err(ValidationError::UnknownFlightType("O".to_string()))
        );
    }

    proptest! {
        #[test]
        fn prop_month_valid_iff_in_range(month in -100i64..100) {
            let validator = Validator::default();
            prop_assert_eq!(validator.validate_month(month).is_ok(), (1..=12).contains(&month));
        }
    }
}
