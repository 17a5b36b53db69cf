//! Prediction Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_engine::FlightRecord;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::AppState;

/// Scheduled and actual timestamp used when only the category fields are known
pub const PLACEHOLDER_DATETIME: &str = "2023-01-01 10:00:00";
/// Destination used when none is supplied
pub const PLACEHOLDER_DESTINATION: &str = "SCL";
/// Day name used when none is supplied
pub const PLACEHOLDER_DAY: &str = "Lunes";

/// A flight to predict
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightInput {
    #[serde(rename = "OPERA")]
    pub airline: String,
    #[serde(rename = "TIPOVUELO")]
    pub flight_type: String,
    #[serde(rename = "MES")]
    pub month: i64,
}

impl FlightInput {
    /// Fill in the timestamp, destination and day placeholders the
    /// temporal extractor needs
    fn into_record(self) -> FlightRecord {
        FlightRecord {
            airline: self.airline,
            flight_type: self.flight_type,
            month: self.month,
            scheduled_datetime: PLACEHOLDER_DATETIME.to_string(),
            actual_datetime: PLACEHOLDER_DATETIME.to_string(),
            destination: PLACEHOLDER_DESTINATION.to_string(),
            day_name: PLACEHOLDER_DAY.to_string(),
        }
    }
}

/// Request body for the predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub flights: Vec<FlightInput>,
}

/// Response for the predict endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predict: Vec<u8>,
}

/// Predict delays for a batch of flights
pub async fn post_predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    metrics::counter!("predict_requests_total").increment(1);

    let Json(request) = payload.map_err(|rejection| {
        metrics::counter!("predict_rejected_total").increment(1);
        warn!("Rejected predict body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })?;

    for flight in &request.flights {
        state
            .validator
            .validate_flight(&flight.airline, &flight.flight_type, flight.month)
            .into_result()
            .map_err(|e| {
                metrics::counter!("predict_rejected_total").increment(1);
                warn!("Rejected flight {:?}: {}", flight, e);
                ApiError::Validation(e)
            })?;
    }

    let records: Vec<FlightRecord> = request
        .flights
        .into_iter()
        .map(FlightInput::into_record)
        .collect();

    let start = Instant::now();
    let predict = state.model.predict_records(&records)?;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    metrics::counter!("predict_flights_total").increment(records.len() as u64);
    metrics::histogram!("predict_latency_ms").record(elapsed_ms);
    debug!("Predicted {} flights in {:.2}ms", records.len(), elapsed_ms);

    Ok(Json(PredictResponse { predict }))
}
