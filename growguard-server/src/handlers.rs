//! HTTP handlers
//!
//! - POST /api/sensor-data - Validate, score and record a reading
//! - GET /api/latest - Most recent reading
//! - GET /api/history - Recent readings, optionally per plant
//! - GET /api/stats - Aggregates over the history
//! - POST /api/clear - Drop the history
//! - POST /api/model/reload - Reload artifacts from disk
//! - GET /health - Liveness and model state

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{SecondsFormat, Utc};
use growguard_core::{Channel, ScoreSource, VERSION};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    config::HISTORY_CAPACITY,
    error::{ApiError, ApiResult},
    state::{AppState, HistoryEntry, ModelState},
    validation::parse_body,
};

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

/// Reply to an accepted reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    /// "ANOMALY" or "NORMAL"
    pub status: String,
    pub anomaly_score: f64,
    pub source: ScoreSource,
}

/// `?limit=&plant_id=`
///
/// `limit` is taken as text so a malformed value falls back to the default
/// instead of rejecting the request. `limit=0` returns every stored reading.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<String>,
    pub plant_id: Option<String>,
}

impl HistoryQuery {
    fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .filter(|&limit| limit > 0)
            .unwrap_or(HISTORY_CAPACITY)
    }
}

/// `?plant_id=`
#[derive(Debug, Default, Deserialize)]
pub struct PlantQuery {
    pub plant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub readings: Vec<HistoryEntry>,
}

/// Aggregates for one channel, rounded to 2 decimals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub current: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_readings: usize,
    pub anomaly_count: usize,
    pub anomaly_percentage: f64,
    pub temperature: ChannelSummary,
    pub humidity: ChannelSummary,
    pub ph: ChannelSummary,
    pub last_reading_time: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub model_state: ModelState,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_state: ModelState,
    pub version: &'static str,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn channel_value(entry: &HistoryEntry, channel: Channel) -> f64 {
    match channel {
        Channel::Temperature => entry.temperature,
        Channel::Humidity => entry.humidity,
        Channel::Ph => entry.ph,
    }
}

/// Aggregate one channel over a non-empty slice of entries
fn summarize(entries: &[HistoryEntry], channel: Channel) -> Option<ChannelSummary> {
    let current = channel_value(entries.last()?, channel);
    let (mut sum, mut min, mut max) = (0.0, f64::INFINITY, f64::NEG_INFINITY);
    for entry in entries {
        let value = channel_value(entry, channel);
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    Some(ChannelSummary {
        current,
        avg: round2(sum / entries.len() as f64),
        min: round2(min),
        max: round2(max),
    })
}

// =============================================================================
// HANDLERS
// =============================================================================

/// POST /api/sensor-data
#[instrument(skip_all)]
pub async fn ingest_reading(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<IngestResponse>> {
    let incoming = parse_body(&body).inspect_err(|e| warn!(error = %e, "Rejected reading"))?;

    let result = state.model.score(&incoming.reading);
    let entry = HistoryEntry::new(
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        &incoming.reading,
        incoming.plant_id,
        &result,
    );

    info!(
        plant_id = %entry.plant_id,
        temperature = entry.temperature,
        humidity = entry.humidity,
        ph = entry.ph,
        status = entry.status,
        score = entry.anomaly_score,
        "Reading scored"
    );
    state.history.record(entry);

    Ok(Json(IngestResponse {
        success: true,
        status: result.status().to_owned(),
        anomaly_score: result.score,
        source: result.source,
    }))
}

/// GET /api/latest
#[instrument(skip_all)]
pub async fn latest(State(state): State<AppState>) -> ApiResult<Json<HistoryEntry>> {
    state
        .history
        .latest()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No readings available".into()))
}

/// GET /api/history
#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let mut readings = state.history.snapshot(query.plant_id.as_deref());
    let limit = query.limit();
    if readings.len() > limit {
        readings.drain(..readings.len() - limit);
    }

    Json(HistoryResponse {
        count: readings.len(),
        readings,
    })
}

/// GET /api/stats
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>, Query(query): Query<PlantQuery>) -> ApiResult<Json<StatsResponse>> {
    if state.history.is_empty() {
        return Err(ApiError::NotFound("No readings available".into()));
    }

    let readings = state.history.snapshot(query.plant_id.as_deref());
    let not_found = || ApiError::NotFound("No readings for this plant".into());
    let last = readings.last().ok_or_else(not_found)?;
    let anomaly_count = readings.iter().filter(|r| r.is_anomaly).count();

    Ok(Json(StatsResponse {
        total_readings: readings.len(),
        anomaly_count,
        anomaly_percentage: round2(anomaly_count as f64 / readings.len() as f64 * 100.0),
        temperature: summarize(&readings, Channel::Temperature).ok_or_else(not_found)?,
        humidity: summarize(&readings, Channel::Humidity).ok_or_else(not_found)?,
        ph: summarize(&readings, Channel::Ph).ok_or_else(not_found)?,
        last_reading_time: last.timestamp.clone(),
    }))
}

/// POST /api/clear
#[instrument(skip_all)]
pub async fn clear(State(state): State<AppState>) -> Json<MessageResponse> {
    let dropped = state.history.len();
    state.history.clear();
    info!(dropped, "History cleared");

    Json(MessageResponse {
        success: true,
        message: "All readings cleared".into(),
    })
}

/// POST /api/model/reload
#[instrument(skip_all)]
pub async fn reload_model(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    let model = state.model.clone();
    let reloaded = tokio::task::spawn_blocking(move || model.reload())
        .await
        .map_err(|e| ApiError::ModelUnavailable(e.to_string()))?;

    match reloaded {
        Ok(model_state) => Ok(Json(ReloadResponse {
            success: true,
            model_state,
        })),
        Err(e) => {
            warn!(error = %e, "Model reload failed, keeping current model");
            Err(ApiError::ModelUnavailable(e.to_string()))
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_state: state.model.state(),
        version: VERSION,
    })
}

/// Any unmatched route
pub async fn not_found() -> impl IntoResponse {
    ApiError::NotFound("Endpoint not found".into()).into_response()
}
