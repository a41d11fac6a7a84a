//! Subcommand implementations

use std::{
    fs::{self, File},
    io::BufWriter,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::Local;
use growguard_connectors::{Connector, HttpConfig, HttpConnector, OutgoingReading};
use growguard_core::SensorReading;
use growguard_ml::{
    write_batch_csv, AnomalyDetector, ArtifactStore, BatchResult, DetectorConfig, ForestConfig,
    ReadingAnalysis, TaggedReading, TrainingCorpus, WarningReport,
};
use growguard_server::ServerConfig;
use tracing::info;

fn file_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

fn display_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn load_detector(artifacts: &Path) -> Result<AnomalyDetector> {
    ArtifactStore::new(artifacts)
        .load()
        .context("No trained detector available, run `growguard train` first")
}

fn load_corpus(path: &Path) -> Result<TrainingCorpus> {
    let corpus = TrainingCorpus::from_csv_path(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if corpus.dropped_rows() > 0 {
        info!(dropped = corpus.dropped_rows(), "Skipped invalid rows");
    }
    Ok(corpus)
}

pub async fn serve(artifacts: PathBuf, bind: SocketAddr) -> Result<()> {
    let config = ServerConfig::default().with_bind(bind).with_artifact_dir(artifacts);
    growguard_server::serve(config).await.context("Server failed")
}

pub fn train(artifacts: &Path, data: &Path, contamination: f64, trees: usize, seed: u64) -> Result<()> {
    let corpus = load_corpus(data)?;
    if corpus.is_empty() {
        bail!("{} contains no valid readings", data.display());
    }

    println!("Loaded {} records ({} dropped)", corpus.len(), corpus.dropped_rows());
    if let Some(channels) = corpus.describe() {
        println!("\nDataset statistics:");
        println!("  {:<12} {:>10} {:>10} {:>10} {:>10}", "channel", "mean", "std", "min", "max");
        for d in channels {
            println!(
                "  {:<12} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
                d.channel.name(),
                d.mean,
                d.std_dev,
                d.min,
                d.max
            );
        }
    }

    let forest = ForestConfig::default()
        .with_contamination(contamination)
        .with_num_trees(trees)
        .with_seed(seed);
    let config = DetectorConfig::default().with_forest(forest);

    let detector = AnomalyDetector::train(&corpus, &config).context("Training failed")?;
    let summary = detector.summary(&corpus);

    println!("\nTraining results:");
    println!("  Trees: {}", summary.num_trees);
    println!("  Offset: {:.6}", summary.offset);
    println!(
        "  Anomalies in training data: {} ({:.2}%)",
        summary.anomalies,
        summary.anomaly_percentage()
    );

    let paths = ArtifactStore::new(artifacts)
        .persist(&detector)
        .context("Failed to save artifacts")?;
    println!("\nSaved scaler to {}", paths.scaler.display());
    println!("Saved model to {}", paths.model.display());
    Ok(())
}

pub fn check(
    artifacts: &Path,
    temperature: f64,
    humidity: f64,
    ph: f64,
    plant_id: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let reading = SensorReading::new(temperature, humidity, ph)?;
    let detector = load_detector(artifacts)?;

    let row = TaggedReading {
        reading,
        plant_id,
        date,
    };
    let mut analysis = ReadingAnalysis::new(row, &detector);
    analysis.analysed_at = Some(display_timestamp());

    print!("{analysis}");
    Ok(())
}

pub fn batch(artifacts: &Path, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let detector = load_detector(artifacts)?;
    let corpus = load_corpus(input)?;
    let results = BatchResult::score_corpus(&corpus, &detector);

    let output = output.unwrap_or_else(|| PathBuf::from(format!("anomaly_results_{}.csv", file_timestamp())));
    let file = File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?;
    write_batch_csv(BufWriter::new(file), &results)?;

    let anomalies = results.iter().filter(|r| r.is_anomaly == "Yes").count();
    println!("Processed {} readings, {} anomalies", results.len(), anomalies);
    println!("Results saved to {}", output.display());
    Ok(())
}

pub fn report(artifacts: &Path, data: &Path, output: Option<PathBuf>) -> Result<()> {
    let detector = load_detector(artifacts)?;
    let corpus = load_corpus(data)?;
    let report = WarningReport::build(&corpus, &detector).generated_at(display_timestamp());
    let text = report.to_string();

    print!("{text}");

    let output = output.unwrap_or_else(|| PathBuf::from(format!("anomaly_report_{}.txt", file_timestamp())));
    fs::write(&output, &text).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Report saved to {}", output.display());
    Ok(())
}

pub fn send(server: &str, temperature: f64, humidity: f64, ph: f64, plant_id: String) -> Result<()> {
    let reading = SensorReading::new(temperature, humidity, ph)?;
    let mut connector = HttpConnector::new(HttpConfig::new(server))?;

    let ack = connector
        .send(&OutgoingReading::new(reading, plant_id))
        .with_context(|| format!("Failed to deliver reading to {}", connector.endpoint()))?;

    match ack.anomaly_score {
        Some(score) => println!("{} (score {score:.4})", ack.status),
        None => println!("{}", ack.status),
    }
    Ok(())
}
