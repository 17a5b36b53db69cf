//! API error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use inference_engine::InferenceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not a well-formed prediction request
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// A flight failed boundary validation
    #[error("Invalid flight data: {0}")]
    Validation(#[from] ValidationError),

    /// Model failure while preprocessing or predicting
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(InferenceError::NotFitted) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Prediction failed: {}", self);
            format!("Internal server error: {}", self)
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
