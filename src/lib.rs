pub mod alerts; // Proactive Alert Matcher
pub mod analysis; // Generative-model client + response parsing
pub mod api; // HTTP JSON API
pub mod batch; // Batch Runner
pub mod config;
pub mod core_state;
pub mod db;
pub mod export; // CSV / PDF formatters
pub mod fhir; // Simulated FHIR import
pub mod models;
pub mod render; // Result Renderer
pub mod storage; // Persistence Adapter
pub mod suggestions; // Suggestion Engine

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Core(#[from] core_state::CoreError),

    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Start the API server and run until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env();
    let bind_addr = config.bind_addr;
    let core = Arc::new(core_state::CoreState::from_config(config)?);

    let server = api::start_api_server(core, bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    server.shutdown().await;
    Ok(())
}
