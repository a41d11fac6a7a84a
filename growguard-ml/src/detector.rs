//! Trained scaler + forest pair
//!
//! The detector is what gets persisted and served. It always standardizes a
//! reading with its own parameters before handing it to its own forest. On
//! disk the pair is tied together by the artifact `run_id` (see `artifact`).

use std::{fmt, str::FromStr};

use crate::{
    ForestConfig, IsolationForest, MLError, MLResult, NormalizationParameters, ScoreResult,
    SensorReading, TrainingCorpus,
};

/// Named contamination presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sensitivity {
    /// 2% of training rows flagged
    Low,
    /// 5% of training rows flagged
    #[default]
    Medium,
    /// 10% of training rows flagged
    High,
    /// 15% of training rows flagged
    VeryHigh,
}

impl Sensitivity {
    /// Contamination fraction for this preset
    pub fn contamination(self) -> f64 {
        match self {
            Sensitivity::Low => 0.02,
            Sensitivity::Medium => 0.05,
            Sensitivity::High => 0.10,
            Sensitivity::VeryHigh => 0.15,
        }
    }

    /// Preset name as accepted by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
            Sensitivity::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sensitivity {
    type Err = MLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            "very-high" | "veryhigh" => Ok(Sensitivity::VeryHigh),
            other => Err(MLError::InvalidParameter(format!("unknown sensitivity '{other}'"))),
        }
    }
}

/// Training configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DetectorConfig {
    /// Forest hyperparameters
    pub forest: ForestConfig,
}

impl DetectorConfig {
    /// Config with the contamination of a sensitivity preset
    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.forest.contamination = sensitivity.contamination();
        self
    }

    /// Replace the forest hyperparameters
    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }
}

/// Counts reported after a training run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    /// Valid rows trained on
    pub rows: usize,
    /// Rows rejected during ingestion
    pub dropped_rows: usize,
    /// Training rows below the decision boundary
    pub anomalies: usize,
    /// Trees in the forest
    pub num_trees: usize,
    /// Calibrated offset
    pub offset: f64,
}

impl TrainingSummary {
    /// Flagged share of training rows in percent
    pub fn anomaly_percentage(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.anomalies as f64 / self.rows as f64 * 100.0
        }
    }
}

/// Fitted scaler and forest
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyDetector {
    params: NormalizationParameters,
    forest: IsolationForest,
}

impl AnomalyDetector {
    /// Pair a scaler with the forest trained on its output
    pub fn from_parts(params: NormalizationParameters, forest: IsolationForest) -> Self {
        Self { params, forest }
    }

    /// Train on a corpus
    pub fn train(corpus: &TrainingCorpus, config: &DetectorConfig) -> MLResult<Self> {
        Self::fit(&corpus.readings(), config)
    }

    /// Train on bare readings
    pub fn fit(readings: &[SensorReading], config: &DetectorConfig) -> MLResult<Self> {
        config.forest.validate()?;

        let params = NormalizationParameters::fit(readings)?;
        let samples = params.transform_all(readings);
        let forest = IsolationForest::fit(&samples, config.forest)?;

        log::info!(
            "Trained detector on {} readings ({} trees, contamination {})",
            readings.len(),
            config.forest.num_trees,
            config.forest.contamination
        );

        Ok(Self { params, forest })
    }

    /// Score one reading
    ///
    /// The score is the forest decision score: negative means anomalous.
    pub fn score(&self, reading: &SensorReading) -> ScoreResult {
        let decision = self.forest.decision_function(&self.params.transform(reading));
        ScoreResult::from_model(decision < 0.0, decision)
    }

    /// Score a batch, in input order
    pub fn score_all(&self, readings: &[SensorReading]) -> Vec<ScoreResult> {
        readings.iter().map(|r| self.score(r)).collect()
    }

    /// Score a corpus and count what the training run flagged
    pub fn summary(&self, corpus: &TrainingCorpus) -> TrainingSummary {
        let anomalies = corpus
            .rows()
            .iter()
            .filter(|row| self.score(&row.reading).is_anomaly)
            .count();

        TrainingSummary {
            rows: corpus.len(),
            dropped_rows: corpus.dropped_rows(),
            anomalies,
            num_trees: self.forest.trees().len(),
            offset: self.forest.offset(),
        }
    }

    /// Fitted scaler
    pub fn params(&self) -> &NormalizationParameters {
        &self.params
    }

    /// Fitted forest
    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Channel, ScoreResult};
    use growguard_core::ScoreSource;

    fn grid() -> Vec<SensorReading> {
        let mut readings = Vec::new();
        for i in 0..8 {
            for j in 0..8 {
                for k in 0..4 {
                    readings.push(
                        SensorReading::new(20.0 + i as f64 * 0.5, 60.0 + j as f64, 6.0 + k as f64 * 0.2).unwrap(),
                    );
                }
            }
        }
        readings
    }

    #[test]
    fn sensitivity_presets() {
        assert_eq!(Sensitivity::default(), Sensitivity::Medium);
        assert_eq!("very_high".parse::<Sensitivity>().unwrap(), Sensitivity::VeryHigh);
        assert_eq!("High".parse::<Sensitivity>().unwrap().contamination(), 0.10);
        assert!("extreme".parse::<Sensitivity>().is_err());

        let config = DetectorConfig::default().with_sensitivity(Sensitivity::Low);
        assert_eq!(config.forest.contamination, 0.02);
    }

    #[test]
    fn scores_come_from_model() {
        let detector = AnomalyDetector::fit(&grid(), &DetectorConfig::default()).unwrap();

        let normal: ScoreResult = detector.score(&SensorReading::new(21.75, 63.5, 6.3).unwrap());
        let outlier = detector.score(&SensorReading::new(21.75, 63.5, 12.0).unwrap());

        assert_eq!(normal.source, ScoreSource::Model);
        assert!(!normal.is_anomaly);
        assert!(outlier.is_anomaly);
        assert!(outlier.score < 0.0);
    }

    #[test]
    fn degenerate_channel_fails_training() {
        let readings: Vec<_> = grid()
            .iter()
            .map(|r| SensorReading::new(r.temperature(), r.humidity(), 6.4).unwrap())
            .collect();

        let err = AnomalyDetector::fit(&readings, &DetectorConfig::default()).unwrap_err();
        assert!(matches!(err, MLError::DegenerateFeature { channel } if channel == Channel::Ph.name()));
    }

    #[test]
    fn invalid_contamination_fails_before_fitting() {
        let config = DetectorConfig::default().with_forest(ForestConfig::default().with_contamination(0.9));
        assert!(matches!(
            AnomalyDetector::fit(&[], &config),
            Err(MLError::InvalidParameter(_))
        ));
    }

    #[test]
    fn summary_counts_training_anomalies() {
        let corpus = TrainingCorpus::from_readings(grid());
        let detector = AnomalyDetector::train(&corpus, &DetectorConfig::default()).unwrap();
        let summary = detector.summary(&corpus);

        assert_eq!(summary.rows, 256);
        assert_eq!(summary.num_trees, 100);
        assert!(summary.anomalies > 0 && summary.anomalies < 40);
        assert!(summary.anomaly_percentage() < 16.0);
    }

    #[test]
    fn batch_matches_single_scores() {
        let readings = grid();
        let detector = AnomalyDetector::fit(&readings, &DetectorConfig::default()).unwrap();
        let batch = detector.score_all(&readings[..10]);

        for (reading, result) in readings[..10].iter().zip(batch) {
            assert_eq!(detector.score(reading), result);
        }
    }
}
