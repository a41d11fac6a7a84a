//! HTTP serving boundary for GrowGuard
//!
//! Accepts readings from sensor nodes, scores them with the published
//! detector (or the rule-based fallback while no detector is available) and
//! keeps a bounded history for dashboards.
//!
//! ```no_run
//! use growguard_server::{serve, ServerConfig};
//!
//! # async fn run() -> std::io::Result<()> {
//! serve(ServerConfig::default().with_artifact_dir("artifacts")).await
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod validation;

pub use config::{ServerConfig, DEFAULT_PORT, HISTORY_CAPACITY};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, History, HistoryEntry, ModelHandle, ModelState, ServingModel};
pub use validation::{parse_body, parse_payload, IncomingReading, DEFAULT_PLANT_ID};

use growguard_ml::ArtifactStore;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Load artifacts, bind and serve until Ctrl-C
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let store = ArtifactStore::new(&config.artifact_dir);
    let model = tokio::task::spawn_blocking(move || ModelHandle::load(store))
        .await
        .map_err(std::io::Error::other)?;
    let state = AppState::new(model);

    let listener = TcpListener::bind(config.bind).await?;
    info!(
        addr = %listener.local_addr()?,
        model_state = ?state.model.state(),
        "GrowGuard server listening"
    );

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
