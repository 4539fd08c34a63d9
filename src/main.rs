//! Main entry point for the medication label system.
//!
//! Starts the REST API server that backs the operator client: catalog and
//! patient lookups, login, the shared basket and the durable audit endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use medilabel_core::constants::{
    DEFAULT_DATA_DIR, DEFAULT_LABEL_ATTRIBUTION, DEFAULT_PROBE_TIMEOUT_MS,
};
use medilabel_core::CoreConfig;

/// # Environment Variables
/// - `MEDILABEL_REST_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `MEDILABEL_DATA_DIR`: Directory with the store files (default: "./data")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medilabel=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("MEDILABEL_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    tracing::info!("++ Starting medilabel REST on {}", rest_addr);

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

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
