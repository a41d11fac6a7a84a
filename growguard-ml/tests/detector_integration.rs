//! End-to-end detector scenarios: training, calibration, persistence

mod common;

use common::{mean_and_population_std, ph_spike_corpus, tagged, HealthyRoom};
use growguard_ml::{
    write_batch_csv, AnomalyDetector, ArtifactStore, BatchResult, Channel, DetectorConfig,
    ForestConfig, MLError, NormalizationParameters, ScoreResult, SensorReading, TrainingCorpus,
    WarningReport,
};
use proptest::prelude::*;

#[test]
fn ph_spike_is_flagged_and_healthy_reading_is_not() {
    let corpus = ph_spike_corpus();
    let detector = AnomalyDetector::train(&corpus, &DetectorConfig::default()).unwrap();

    let normal = detector.score(&SensorReading::new(23.0, 65.0, 6.4).unwrap());
    let spike = detector.score(&SensorReading::new(23.0, 65.0, 12.0).unwrap());

    assert!(!normal.is_anomaly, "normal scored {}", normal.score);
    assert!(normal.score.abs() < 0.25);

    assert!(spike.is_anomaly, "spike scored {}", spike.score);
    assert!(spike.score < 0.0);
    assert!(spike.score < normal.score);
}

#[test]
fn training_flags_contamination_share() {
    let readings = HealthyRoom::new(7).readings(1000);
    let detector = AnomalyDetector::fit(&readings, &DetectorConfig::default()).unwrap();

    let flagged = detector
        .score_all(&readings)
        .iter()
        .filter(|r| r.is_anomaly)
        .count();

    assert!((45..=55).contains(&flagged), "flagged {flagged} of 1000");
}

#[test]
fn reloaded_detector_scores_identically() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());

    let detector = AnomalyDetector::train(&ph_spike_corpus(), &DetectorConfig::default()).unwrap();
    store.persist(&detector).unwrap();
    let reloaded = store.load().unwrap();

    let fresh = HealthyRoom::new(99).readings(100);
    let before: Vec<ScoreResult> = detector.score_all(&fresh);
    let after: Vec<ScoreResult> = reloaded.score_all(&fresh);

    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.is_anomaly, b.is_anomaly);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }
}

#[test]
fn constant_ph_column_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("artifacts"));

    let readings: Vec<_> = HealthyRoom::new(3)
        .readings(100)
        .iter()
        .map(|r| SensorReading::new(r.temperature(), r.humidity(), 6.4).unwrap())
        .collect();

    let result = AnomalyDetector::fit(&readings, &DetectorConfig::default()).and_then(|d| store.persist(&d));

    assert!(matches!(result, Err(MLError::DegenerateFeature { channel: "ph" })));
    assert!(!store.exists());
}

#[test]
fn empty_corpus_fails() {
    let err = AnomalyDetector::train(&TrainingCorpus::default(), &DetectorConfig::default()).unwrap_err();
    assert!(matches!(err, MLError::EmptyCorpus));
}

#[test]
fn same_seed_same_model() {
    let corpus = ph_spike_corpus();
    let a = AnomalyDetector::train(&corpus, &DetectorConfig::default()).unwrap();
    let b = AnomalyDetector::train(&corpus, &DetectorConfig::default()).unwrap();
    assert_eq!(a, b);

    let reseeded = DetectorConfig::default().with_forest(ForestConfig::default().with_seed(43));
    let c = AnomalyDetector::train(&corpus, &reseeded).unwrap();
    assert_ne!(a, c);
}

#[test]
fn csv_corpus_to_batch_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plant_health_data.csv");

    let mut room = HealthyRoom::new(11);
    let mut csv = String::from("Plant_ID,Date,Temperature (°C),Humidity (%),pH Level\n");
    for i in 0..60 {
        let r = room.reading();
        csv.push_str(&format!("{},2024-10-{:02},{},{},{}\n", i % 3 + 1, i % 28 + 1, r.temperature(), r.humidity(), r.ph()));
    }
    csv.push_str("2,2024-10-30,bad,65.0,6.4\n");
    std::fs::write(&input, csv).unwrap();

    let corpus = TrainingCorpus::from_csv_path(&input).unwrap();
    assert_eq!(corpus.len(), 60);
    assert_eq!(corpus.dropped_rows(), 1);

    let detector = AnomalyDetector::train(&corpus, &DetectorConfig::default()).unwrap();
    let results = BatchResult::score_corpus(&corpus, &detector);
    assert_eq!(results.len(), 60);
    assert!(results.iter().all(|r| r.is_anomaly == "Yes" || r.is_anomaly == "No"));

    let mut out = Vec::new();
    write_batch_csv(&mut out, &results).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 61);
    assert!(text.lines().nth(1).unwrap().starts_with("1,2024-10-01,"));

    let report = WarningReport::build(&corpus, &detector);
    let flagged = results.iter().filter(|r| r.is_anomaly == "Yes").count();
    assert_eq!(report.anomaly_count(), flagged);
}

#[test]
fn tagged_rows_keep_metadata_in_report() {
    let mut room = HealthyRoom::new(5);
    let mut readings = room.readings(150);
    readings.push(room.with_ph(11.5));
    let corpus = tagged(&readings);

    let detector = AnomalyDetector::train(&corpus, &DetectorConfig::default()).unwrap();
    let report = WarningReport::build(&corpus, &detector);

    let spike = report
        .warnings()
        .iter()
        .find(|w| w.reading.ph() == 11.5)
        .expect("pH spike reported");
    assert_eq!(spike.index, 150);
    assert!(spike.plant_id.is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn normalized_training_data_is_standard(seed in any::<u64>(), n in 2usize..300) {
        let readings = HealthyRoom::new(seed).readings(n);
        let params = NormalizationParameters::fit(&readings).unwrap();
        let samples = params.transform_all(&readings);

        for channel in Channel::ALL {
            let column: Vec<f64> = samples.iter().map(|s| s[channel.index()]).collect();
            let (mean, std) = mean_and_population_std(&column);
            prop_assert!(mean.abs() < 1e-9, "{} mean {}", channel.name(), mean);
            prop_assert!((std - 1.0).abs() < 1e-9, "{} std {}", channel.name(), std);
        }
    }
}
