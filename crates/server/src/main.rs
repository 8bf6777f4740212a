//! # co2-server
//!
//! Serves monthly CO2 forecasts from a model artifact written by
//! `co2cast train`. Startup fails if the artifact cannot be loaded.

use anyhow::Context;
use co2_server::{build_router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "co2_server=info,co2_core=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let addr = config.socket_addr().context("invalid server configuration")?;

    let state = match AppState::load(&config.model_path) {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(path = %config.model_path.display(), error = %err, "failed to load model on startup");
            return Err(err).context("failed to load model on startup");
        }
    };
    tracing::info!(path = %config.model_path.display(), "model loaded successfully");

    let app = build_router(state);

    tracing::info!("co2-server v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
