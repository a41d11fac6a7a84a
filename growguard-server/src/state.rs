//! Serving-side state: the published model and the rolling history
//!
//! ## Model lifecycle
//!
//! ```text
//! Unloaded ── load ok ──▶ Loaded ◀── reload ok ──┐
//!    │                      │                    │
//!    └── load fails ──▶ Degraded ── reload ok ───┘
//! ```
//!
//! The published model sits behind an `RwLock<Arc<_>>`. The lock is held only
//! to clone or replace the `Arc`; scoring runs on the clone, so a reload never
//! blocks in-flight requests and never exposes a half-loaded detector.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use growguard_core::{buffer::CircularBuffer, RuleBasedScorer, ScoreResult, ScoreSource, SensorReading};
use growguard_ml::{AnomalyDetector, ArtifactStore, MLResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::HISTORY_CAPACITY;

/// Externally visible model state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    /// No load attempted yet
    Unloaded,
    /// Trained detector in use
    Loaded,
    /// Artifacts unavailable; rule-based fallback in use
    Degraded,
}

/// What a request scores against
#[derive(Debug)]
pub enum ServingModel {
    /// No load attempted yet
    Unloaded,
    /// Trained detector
    Loaded(AnomalyDetector),
    /// Load failed with `reason`
    Degraded {
        /// Why the artifacts could not be used
        reason: String,
    },
}

impl ServingModel {
    /// State label
    pub fn state(&self) -> ModelState {
        match self {
            ServingModel::Unloaded => ModelState::Unloaded,
            ServingModel::Loaded(_) => ModelState::Loaded,
            ServingModel::Degraded { .. } => ModelState::Degraded,
        }
    }
}

/// Holder of the published model
#[derive(Debug)]
pub struct ModelHandle {
    current: RwLock<Arc<ServingModel>>,
    store: ArtifactStore,
    fallback: RuleBasedScorer,
}

impl ModelHandle {
    /// Handle in the `Unloaded` state
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(ServingModel::Unloaded)),
            store,
            fallback: RuleBasedScorer::default(),
        }
    }

    /// Handle with artifacts loaded (or degraded when they are unavailable)
    pub fn load(store: ArtifactStore) -> Self {
        let handle = Self::new(store);
        handle.initialize();
        handle
    }

    /// Handle publishing an in-memory detector
    pub fn with_detector(store: ArtifactStore, detector: AnomalyDetector) -> Self {
        let handle = Self::new(store);
        handle.replace(ServingModel::Loaded(detector));
        handle
    }

    /// First load attempt; failure moves to `Degraded` and is logged once
    pub fn initialize(&self) -> ModelState {
        let model = match self.store.load() {
            Ok(detector) => {
                info!(dir = %self.store.dir().display(), "Loaded anomaly model");
                ServingModel::Loaded(detector)
            }
            Err(e) => {
                warn!(error = %e, "Anomaly model unavailable, using rule-based fallback");
                ServingModel::Degraded { reason: e.to_string() }
            }
        };
        let state = model.state();
        self.replace(model);
        state
    }

    /// Currently published model
    pub fn current(&self) -> Arc<ServingModel> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Publish a new model; the single replacement point
    pub fn replace(&self, model: ServingModel) {
        let model = Arc::new(model);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = model;
    }

    /// Load the artifact pair and publish it
    ///
    /// The new pair is loaded completely before the swap. On failure the
    /// published model is left untouched.
    pub fn reload(&self) -> MLResult<ModelState> {
        let detector = self.store.load()?;
        self.replace(ServingModel::Loaded(detector));
        info!(dir = %self.store.dir().display(), "Reloaded anomaly model");
        Ok(ModelState::Loaded)
    }

    /// Current state label
    pub fn state(&self) -> ModelState {
        self.current().state()
    }

    /// Score with the published model, or the fallback when there is none
    pub fn score(&self, reading: &SensorReading) -> ScoreResult {
        match self.current().as_ref() {
            ServingModel::Loaded(detector) => detector.score(reading),
            ServingModel::Unloaded | ServingModel::Degraded { .. } => {
                let result = self.fallback.score(reading);
                for violation in self.fallback.violations(reading) {
                    debug!(channel = violation.channel.name(), error = %violation.error, "Bounds violation");
                }
                result
            }
        }
    }
}

/// One scored reading in the history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// RFC 3339 time the reading was received
    pub timestamp: String,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub plant_id: String,
    pub is_anomaly: bool,
    pub anomaly_score: f64,
    /// "ANOMALY" or "NORMAL"
    pub status: &'static str,
    /// Scorer that produced the verdict
    pub source: ScoreSource,
}

impl HistoryEntry {
    /// Entry for a reading scored at `timestamp`
    pub fn new(timestamp: String, reading: &SensorReading, plant_id: String, result: &ScoreResult) -> Self {
        Self {
            timestamp,
            temperature: reading.temperature(),
            humidity: reading.humidity(),
            ph: reading.ph(),
            plant_id,
            is_anomaly: result.is_anomaly,
            anomaly_score: result.score,
            status: result.status(),
            source: result.source,
        }
    }
}

/// Bounded history of recent readings, oldest evicted first
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<CircularBuffer<HistoryEntry, HISTORY_CAPACITY>>,
}

impl History {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CircularBuffer<HistoryEntry, HISTORY_CAPACITY>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry
    pub fn record(&self, entry: HistoryEntry) {
        self.lock().push(entry);
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<HistoryEntry> {
        self.lock().last().cloned()
    }

    /// Entries oldest first, optionally restricted to one plant
    pub fn snapshot(&self, plant_id: Option<&str>) -> Vec<HistoryEntry> {
        self.lock()
            .iter()
            .filter(|entry| plant_id.map_or(true, |id| entry.plant_id == id))
            .cloned()
            .collect()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no entries are stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Shared state passed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub model: Arc<ModelHandle>,
    pub history: Arc<History>,
}

impl AppState {
    /// State around a model handle with an empty history
    pub fn new(model: ModelHandle) -> Self {
        Self {
            model: Arc::new(model),
            history: Arc::new(History::new()),
        }
    }
}
