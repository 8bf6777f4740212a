//! API route handlers

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Horizon used when the request omits `steps`.
pub const DEFAULT_STEPS: i64 = 12;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn default_steps() -> i64 {
    DEFAULT_STEPS
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Number of months to forecast
    #[serde(default = "default_steps")]
    pub steps: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastResult {
    pub forecast_start_date: String,
    pub forecast_end_date: String,
    /// Predicted ppm by ISO date, rounded to two decimals
    pub predictions: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// `GET /`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Model service running".to_string(),
        model_loaded: state.is_loaded(),
    })
}

/// `POST /forecast`
pub async fn forecast(
    State(state): State<AppState>,
    body: Result<Json<ForecastQuery>, JsonRejection>,
) -> Result<Json<ForecastResult>, ApiError> {
    let Json(query) = body?;
    let model = state.model().ok_or(ApiError::NotReady)?;

    let steps = usize::try_from(query.steps).map_err(|_| {
        ApiError::Prediction(format!(
            "forecast horizon must be a positive number of months, got {}",
            query.steps
        ))
    })?;
    let points = model
        .forecast(steps)
        .map_err(|e| ApiError::Prediction(e.to_string()))?;

    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Err(ApiError::Prediction("model returned no predictions".to_string())),
    };

    let predictions = points
        .iter()
        .map(|p| (p.date.format(DATE_FORMAT).to_string(), round2(p.value)))
        .collect();

    tracing::debug!(steps, start = %first, end = %last, "forecast served");

    Ok(Json(ForecastResult {
        forecast_start_date: first.format(DATE_FORMAT).to_string(),
        forecast_end_date: last.format(DATE_FORMAT).to_string(),
        predictions,
    }))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
