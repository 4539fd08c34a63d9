//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging when only the backend is needed; the
//! workspace's main `medilabel-run` binary is the usual entry point.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use medilabel_core::constants::{
    DEFAULT_DATA_DIR, DEFAULT_LABEL_ATTRIBUTION, DEFAULT_PROBE_TIMEOUT_MS,
};
use medilabel_core::CoreConfig;

/// Main entry point for the medilabel REST API server.
///
/// Starts the REST API server on the configured address (default:
/// 0.0.0.0:5000) with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `MEDILABEL_REST_ADDR`: Server address (default: "0.0.0.0:5000")
/// - `MEDILABEL_DATA_DIR`: Directory with the store files (default: "./data")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the data directory is missing or a store file fails to load,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDILABEL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    tracing::info!("-- Starting medilabel REST API on {}", addr);

    let data_dir = std::env::var("MEDILABEL_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let data_path = Path::new(&data_dir);
    if !data_path.exists() {
        anyhow::bail!("Data directory does not exist: {}", data_path.display());
    }

    let cfg = CoreConfig::new(
        PathBuf::from(data_path),
        None,
        Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        DEFAULT_LABEL_ATTRIBUTION.to_string(),
    )?;

    let state = AppState::load(&cfg)?;
    let app = api_rest::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
