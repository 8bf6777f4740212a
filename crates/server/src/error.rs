//! API error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to clients.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// No model loaded
    #[error("Model is not loaded or ready.")]
    NotReady,

    /// The model rejected the request
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// The request body could not be read
    #[error("Invalid request: {message}")]
    InvalidRequest { status: StatusCode, message: String },
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidRequest { status, .. } => *status,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::NotReady => tracing::warn!("forecast requested before a model was loaded"),
            ApiError::Prediction(message) => tracing::error!(%message, "forecast failed"),
            ApiError::InvalidRequest { message, .. } => {
                tracing::debug!(%message, "rejected forecast request")
            }
        }
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
