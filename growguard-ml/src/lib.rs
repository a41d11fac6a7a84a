//! Statistical anomaly detection for hydroponic sensor readings
//!
//! ## Overview
//!
//! Readings are scored by a two-stage detector: a per-channel standardizing
//! scaler followed by an Isolation Forest. Both stages are fit once on a
//! historical corpus, persisted as JSON artifacts, and reloaded by the serving
//! process.
//!
//! ## Why Isolation Forest?
//!
//! 1. **Unsupervised**: the historical corpus carries no labels
//! 2. **Small Model**: only tree structures are kept, never training data
//! 3. **Fast Inference**: one root-to-leaf walk per tree
//!
//! ## Algorithm Overview
//!
//! ```text
//! Normal points:  need many random partitions to isolate
//! Anomalies:      isolated after a few partitions
//!
//! raw score  = -2^(-E[h(x)] / c(psi))
//! decision   = raw score - offset
//! anomaly    = decision < 0
//! ```
//!
//! `offset` is calibrated on the training corpus so that roughly the
//! `contamination` fraction of training rows falls below zero.
//!
//! ## Usage
//!
//! ```no_run
//! use growguard_ml::{AnomalyDetector, ArtifactStore, DetectorConfig, TrainingCorpus};
//!
//! let corpus = TrainingCorpus::from_csv_path("plant_health_data.csv")?;
//! let detector = AnomalyDetector::train(&corpus, &DetectorConfig::default())?;
//!
//! let store = ArtifactStore::new("artifacts");
//! store.persist(&detector)?;
//!
//! let reloaded = store.load()?;
//! # Ok::<(), growguard_ml::MLError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;

use thiserror::Error;

pub mod artifact;
pub mod corpus;
pub mod detector;
pub mod forest;
pub mod node;
pub mod normalizer;
pub mod report;
pub mod scoring;
pub mod tree;

mod rng;

// Public API
pub use artifact::{ArtifactPaths, ArtifactStore, MODEL_FILE, SCALER_FILE};
pub use corpus::{ChannelDescription, RawRecord, TaggedReading, TrainingCorpus, MIN_STABLE_CORPUS_ROWS};
pub use detector::{AnomalyDetector, DetectorConfig, Sensitivity, TrainingSummary};
pub use forest::{ForestConfig, ForestStats, IsolationForest};
pub use node::{average_path_length, Node, NodeType};
pub use normalizer::{ChannelStats, NormalizationParameters};
pub use report::{write_batch_csv, AnomalyWarning, BatchResult, ReadingAnalysis, WarningReport};
pub use rng::Rng;
pub use scoring::{percentile, raw_score};
pub use tree::{IsolationTree, TreeConfig};

pub use growguard_core::{Channel, ScoreResult, SensorReading, FEATURE_COUNT};

/// Feature vector in channel order
pub type Sample = [f64; FEATURE_COUNT];

/// Default number of trees
pub const DEFAULT_NUM_TREES: usize = 100;

/// Default sub-sample size per tree
pub const DEFAULT_SAMPLE_SIZE: usize = 256;

/// Default expected fraction of anomalies in training data
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Default random seed
pub const DEFAULT_SEED: u64 = 42;

/// ML error types
#[derive(Debug, Error)]
pub enum MLError {
    /// Nothing to fit on
    #[error("Training corpus is empty")]
    EmptyCorpus,

    /// A channel has zero variance and cannot be standardized
    #[error("Channel '{channel}' has zero variance and cannot be standardized")]
    DegenerateFeature {
        /// Offending channel
        channel: &'static str,
    },

    /// Configuration value out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Artifacts missing, unreadable or corrupt
    #[error("Artifact unavailable at {}: {reason}", path.display())]
    ArtifactUnavailable {
        /// File that failed
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Corpus could not be read
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// CSV parsing or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ML operations
pub type MLResult<T> = Result<T, MLError>;
