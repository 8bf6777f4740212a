//! # co2-server
//!
//! REST prediction service for the fitted CO2 model.
//!
//! The model is loaded once during startup and handed to the router inside
//! [`AppState`]; handlers only ever read it.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use state::AppState;

/// Build the application router around `state`.
pub fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::health))
        .route("/forecast", post(routes::forecast))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
