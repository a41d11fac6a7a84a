//! API route definitions
//!
//! ## Reading Endpoints
//! - `/api/sensor-data`, `/api/latest`, `/api/history`, `/api/stats`, `/api/clear`
//!
//! ## Model Endpoints
//! - `/api/model/reload`
//!
//! ## Infrastructure Endpoints
//! - `/health`

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers::*, state::AppState};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sensor-data", post(ingest_reading))
        .route("/latest", get(latest))
        .route("/history", get(history))
        .route("/stats", get(stats))
        .route("/clear", post(clear))
        .route("/model/reload", post(reload_model));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
