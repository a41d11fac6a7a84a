//! Persisted detector artifacts
//!
//! A trained detector is stored as two JSON documents in one directory:
//!
//! ```text
//! <dir>/anomaly_scaler.json   normalization parameters
//! <dir>/anomaly_model.json    isolation forest (trees, config, offset)
//! ```
//!
//! Each file is written to a temporary file in the same directory and renamed
//! into place, so a reader never observes a half-written artifact. Floats use
//! round-trip formatting, so a reloaded detector scores bit-identically.
//!
//! The two renames are not one atomic step. Both documents therefore carry the
//! same `run_id`, a fingerprint of the pair written by one `persist` call, and
//! `load` refuses a scaler and model whose ids differ. A reader that lands
//! between the renames, or after a persist that failed half way, sees
//! `ArtifactUnavailable` instead of a mixed detector.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{AnomalyDetector, IsolationForest, MLError, MLResult, NormalizationParameters};

/// File name of the scaler artifact
pub const SCALER_FILE: &str = "anomaly_scaler.json";

/// File name of the model artifact
pub const MODEL_FILE: &str = "anomaly_model.json";

/// Artifact layout version written by this build
const FORMAT_VERSION: u32 = 2;

#[derive(Serialize, Deserialize)]
struct Versioned<T> {
    format_version: u32,
    #[serde(default)]
    run_id: String,
    body: T,
}

/// Locations of a persisted artifact pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Scaler document
    pub scaler: PathBuf,
    /// Model document
    pub model: PathBuf,
}

/// Reads and writes detector artifacts in a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `dir`
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Artifact directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the scaler artifact
    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE)
    }

    /// Path of the model artifact
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    /// True when both artifact files exist
    pub fn exists(&self) -> bool {
        self.scaler_path().is_file() && self.model_path().is_file()
    }

    /// Write both artifacts, scaler first, replacing any existing ones
    pub fn persist(&self, detector: &AnomalyDetector) -> MLResult<ArtifactPaths> {
        fs::create_dir_all(&self.dir)?;

        let scaler = serde_json::to_vec(detector.params()).map_err(std::io::Error::from)?;
        let model = serde_json::to_vec(detector.forest()).map_err(std::io::Error::from)?;
        let run_id = run_fingerprint(&scaler, &model);

        let paths = ArtifactPaths {
            scaler: self.scaler_path(),
            model: self.model_path(),
        };
        self.write_atomic(&paths.scaler, &run_id, detector.params())?;
        self.write_atomic(&paths.model, &run_id, detector.forest())?;

        log::info!("Saved detector artifacts to {} (run {run_id})", self.dir.display());
        Ok(paths)
    }

    /// Load and check both artifacts
    ///
    /// Any missing, unreadable or inconsistent file yields
    /// `MLError::ArtifactUnavailable` naming that file.
    pub fn load(&self) -> MLResult<AnomalyDetector> {
        let scaler_path = self.scaler_path();
        let scaler: Versioned<NormalizationParameters> = read_versioned(&scaler_path)?;
        scaler.body.validate().map_err(|reason| unavailable(&scaler_path, reason))?;

        let model_path = self.model_path();
        let model: Versioned<IsolationForest> = read_versioned(&model_path)?;
        model.body.validate().map_err(|reason| unavailable(&model_path, reason))?;

        if scaler.run_id != model.run_id {
            return Err(unavailable(
                &model_path,
                format!(
                    "scaler and model come from different training runs ({} vs {})",
                    scaler.run_id, model.run_id
                ),
            ));
        }

        let (params, forest) = (scaler.body, model.body);
        log::debug!(
            "Loaded detector artifacts from {} (run {}, {} trees)",
            self.dir.display(),
            model.run_id,
            forest.trees().len()
        );

        Ok(AnomalyDetector::from_parts(params, forest))
    }

    fn write_atomic<T: Serialize>(&self, path: &Path, run_id: &str, body: &T) -> MLResult<()> {
        let temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(
                &mut writer,
                &Versioned {
                    format_version: FORMAT_VERSION,
                    run_id: run_id.to_owned(),
                    body,
                },
            )
            .map_err(std::io::Error::from)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| MLError::Io(e.error))?;
        Ok(())
    }
}

/// FNV-1a over both serialized bodies, as 16 hex digits
fn run_fingerprint(scaler: &[u8], model: &[u8]) -> String {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let hash = scaler
        .iter()
        .chain([0u8].iter())
        .chain(model.iter())
        .fold(OFFSET_BASIS, |hash, &byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME));
    format!("{hash:016x}")
}

fn read_versioned<T: DeserializeOwned>(path: &Path) -> MLResult<Versioned<T>> {
    let file = File::open(path).map_err(|e| unavailable(path, e.to_string()))?;

    let document: Versioned<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| unavailable(path, format!("malformed artifact: {e}")))?;

    if document.format_version != FORMAT_VERSION {
        return Err(unavailable(
            path,
            format!(
                "unsupported format version {} (expected {FORMAT_VERSION})",
                document.format_version
            ),
        ));
    }

    Ok(document)
}

fn unavailable(path: &Path, reason: impl Into<String>) -> MLError {
    MLError::ArtifactUnavailable {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DetectorConfig, SensorReading};

    fn detector_around(temperature: f64, humidity: f64) -> AnomalyDetector {
        let readings: Vec<_> = (0..60)
            .map(|i| {
                SensorReading::new(
                    temperature + (i % 7) as f64,
                    humidity + (i % 11) as f64,
                    6.0 + (i % 5) as f64 * 0.1,
                )
                .unwrap()
            })
            .collect();
        AnomalyDetector::fit(&readings, &DetectorConfig::default()).unwrap()
    }

    fn detector() -> AnomalyDetector {
        detector_around(20.0, 60.0)
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nope"));

        assert!(!store.exists());
        match store.load() {
            Err(MLError::ArtifactUnavailable { path, .. }) => assert_eq!(path, store.scaler_path()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let detector = detector();

        let paths = store.persist(&detector).unwrap();
        assert!(store.exists());
        assert_eq!(paths.model, dir.path().join(MODEL_FILE));
        assert_eq!(store.load().unwrap(), detector);
    }

    #[test]
    fn corrupt_model_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(&detector()).unwrap();

        fs::write(store.model_path(), b"{\"format_version\":2,\"run_id\":\"0\",\"body\":").unwrap();
        match store.load() {
            Err(MLError::ArtifactUnavailable { path, reason }) => {
                assert_eq!(path, store.model_path());
                assert!(reason.contains("malformed"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn future_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(&detector()).unwrap();

        let text = fs::read_to_string(store.scaler_path()).unwrap();
        fs::write(store.scaler_path(), text.replacen("\"format_version\":2", "\"format_version\":9", 1)).unwrap();

        assert!(matches!(store.load(), Err(MLError::ArtifactUnavailable { .. })));
    }

    #[test]
    fn scaler_from_another_run_is_rejected() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(first.path());
        let other = ArtifactStore::new(second.path());
        store.persist(&detector()).unwrap();
        other.persist(&detector_around(30.0, 45.0)).unwrap();

        fs::copy(other.scaler_path(), store.scaler_path()).unwrap();
        match store.load() {
            Err(MLError::ArtifactUnavailable { path, reason }) => {
                assert_eq!(path, store.model_path());
                assert!(reason.contains("different training runs"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn interrupted_retrain_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.persist(&detector()).unwrap();

        let retrained = detector_around(26.0, 50.0);
        let run_id = run_fingerprint(
            &serde_json::to_vec(retrained.params()).unwrap(),
            &serde_json::to_vec(retrained.forest()).unwrap(),
        );
        store.write_atomic(&store.scaler_path(), &run_id, retrained.params()).unwrap();

        assert!(matches!(store.load(), Err(MLError::ArtifactUnavailable { .. })));

        store.persist(&retrained).unwrap();
        assert_eq!(store.load().unwrap(), retrained);
    }

    #[test]
    fn same_pair_same_run_id() {
        let detector = detector();
        let scaler = serde_json::to_vec(detector.params()).unwrap();
        let model = serde_json::to_vec(detector.forest()).unwrap();

        assert_eq!(run_fingerprint(&scaler, &model), run_fingerprint(&scaler, &model));
        assert_ne!(run_fingerprint(&scaler, &model), run_fingerprint(&model, &scaler));
        assert_eq!(run_fingerprint(&scaler, &model).len(), 16);
    }
}
