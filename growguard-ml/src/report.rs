//! Human- and machine-readable outputs for scored corpora
//!
//! - `WarningReport`: text report listing every anomalous row
//! - `BatchResult` / `write_batch_csv`: one CSV row per scored reading
//! - `ReadingAnalysis`: verdict text for a single reading

use std::{fmt, io::Write};

use serde::Serialize;

use crate::{AnomalyDetector, Channel, MLResult, ScoreResult, SensorReading, TaggedReading, TrainingCorpus};

const RULE: &str = "================================================================================";
const DIVIDER: &str = "--------------------------------------------------------------------------------";
const UNKNOWN: &str = "Unknown";

/// One anomalous row in a warning report
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyWarning {
    /// Position of the row among the valid corpus rows
    pub index: usize,
    /// Plant identifier
    pub plant_id: Option<String>,
    /// Date text
    pub date: Option<String>,
    /// Channel values
    pub reading: SensorReading,
    /// Model decision score
    pub score: f64,
}

/// Anomaly report over a whole corpus
#[derive(Debug, Clone, PartialEq)]
pub struct WarningReport {
    generated_at: Option<String>,
    total: usize,
    warnings: Vec<AnomalyWarning>,
}

impl WarningReport {
    /// Score every row of `corpus` and collect the anomalies
    pub fn build(corpus: &TrainingCorpus, detector: &AnomalyDetector) -> Self {
        let warnings = corpus
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let result = detector.score(&row.reading);
                result.is_anomaly.then(|| AnomalyWarning {
                    index,
                    plant_id: row.plant_id.clone(),
                    date: row.date.clone(),
                    reading: row.reading,
                    score: result.score,
                })
            })
            .collect();

        Self {
            generated_at: None,
            total: corpus.len(),
            warnings,
        }
    }

    /// Stamp the report header with a generation time
    pub fn generated_at(mut self, timestamp: impl Into<String>) -> Self {
        self.generated_at = Some(timestamp.into());
        self
    }

    /// Anomalous rows in corpus order
    pub fn warnings(&self) -> &[AnomalyWarning] {
        &self.warnings
    }

    /// Rows scored
    pub fn total(&self) -> usize {
        self.total
    }

    /// Rows flagged
    pub fn anomaly_count(&self) -> usize {
        self.warnings.len()
    }

    /// Rows not flagged
    pub fn normal_count(&self) -> usize {
        self.total - self.warnings.len()
    }

    /// Flagged share in percent, 0 for an empty report
    pub fn anomaly_percentage(&self) -> f64 {
        percent(self.anomaly_count(), self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

impl fmt::Display for WarningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        match &self.generated_at {
            Some(at) => writeln!(f, "ANOMALY DETECTION REPORT - {at}")?,
            None => writeln!(f, "ANOMALY DETECTION REPORT")?,
        }
        writeln!(f, "{RULE}")?;

        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(f, "  Total Records: {}", self.total)?;
        writeln!(
            f,
            "  Normal: {} ({:.2}%)",
            self.normal_count(),
            percent(self.normal_count(), self.total)
        )?;
        writeln!(
            f,
            "  Anomalies: {} ({:.2}%)",
            self.anomaly_count(),
            self.anomaly_percentage()
        )?;
        writeln!(f)?;

        if self.warnings.is_empty() {
            writeln!(f, "No anomalies detected. All readings are within normal ranges.")?;
        } else {
            writeln!(f, "ANOMALIES DETECTED ({} total):", self.warnings.len())?;
            writeln!(f, "{DIVIDER}")?;
            for (i, warning) in self.warnings.iter().enumerate() {
                writeln!(
                    f,
                    "  [{}] Plant ID: {} | Date: {}",
                    i + 1,
                    warning.plant_id.as_deref().unwrap_or(UNKNOWN),
                    warning.date.as_deref().unwrap_or(UNKNOWN)
                )?;
                writeln!(f, "      Temperature: {}{}", warning.reading.temperature(), Channel::Temperature.unit())?;
                writeln!(f, "      Humidity: {}{}", warning.reading.humidity(), Channel::Humidity.unit())?;
                writeln!(f, "      pH Level: {}", warning.reading.ph())?;
                writeln!(f, "      Anomaly Score: {:.4}", warning.score)?;
            }
        }

        writeln!(f, "{RULE}")
    }
}

/// One scored row of a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    /// Plant identifier
    #[serde(rename = "Plant_ID")]
    pub plant_id: String,
    /// Date text
    #[serde(rename = "Date")]
    pub date: String,
    /// Temperature in °C
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    /// Relative humidity in %
    #[serde(rename = "Humidity")]
    pub humidity: f64,
    /// Solution pH
    #[serde(rename = "pH_Level")]
    pub ph: f64,
    /// "Yes" or "No"
    #[serde(rename = "Is_Anomaly")]
    pub is_anomaly: &'static str,
    /// Model decision score
    #[serde(rename = "Anomaly_Score")]
    pub score: f64,
}

impl BatchResult {
    /// Pair a tagged row with its score
    pub fn new(row: &TaggedReading, result: &ScoreResult) -> Self {
        Self {
            plant_id: row.plant_id.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
            date: row.date.clone().unwrap_or_else(|| UNKNOWN.to_owned()),
            temperature: row.reading.temperature(),
            humidity: row.reading.humidity(),
            ph: row.reading.ph(),
            is_anomaly: if result.is_anomaly { "Yes" } else { "No" },
            score: result.score,
        }
    }

    /// Score every row of a corpus
    pub fn score_corpus(corpus: &TrainingCorpus, detector: &AnomalyDetector) -> Vec<Self> {
        corpus
            .rows()
            .iter()
            .map(|row| Self::new(row, &detector.score(&row.reading)))
            .collect()
    }
}

/// Write batch results as CSV with a header row
pub fn write_batch_csv<W: Write>(writer: W, results: &[BatchResult]) -> MLResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}

/// Verdict for a single reading, rendered by `Display`
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingAnalysis {
    /// Analysed row
    pub row: TaggedReading,
    /// Score and verdict
    pub result: ScoreResult,
    /// Time the analysis ran, shown in the header
    pub analysed_at: Option<String>,
}

impl ReadingAnalysis {
    /// Score one tagged reading
    pub fn new(row: TaggedReading, detector: &AnomalyDetector) -> Self {
        let result = detector.score(&row.reading);
        Self {
            row,
            result,
            analysed_at: None,
        }
    }
}

impl fmt::Display for ReadingAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = &RULE[..70];
        let reading = &self.row.reading;

        writeln!(f, "{rule}")?;
        match &self.analysed_at {
            Some(at) => writeln!(f, "SENSOR READING ANALYSIS - {at}")?,
            None => writeln!(f, "SENSOR READING ANALYSIS")?,
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "Input Data:")?;
        writeln!(f, "  Plant ID: {}", self.row.plant_id.as_deref().unwrap_or(UNKNOWN))?;
        writeln!(f, "  Date: {}", self.row.date.as_deref().unwrap_or(UNKNOWN))?;
        writeln!(f, "  Temperature: {}{}", reading.temperature(), Channel::Temperature.unit())?;
        writeln!(f, "  Humidity: {}{}", reading.humidity(), Channel::Humidity.unit())?;
        writeln!(f, "  pH Level: {}", reading.ph())?;
        writeln!(f)?;
        writeln!(f, "Analysis Result:")?;
        if self.result.is_anomaly {
            writeln!(f, "  ANOMALY DETECTED")?;
            writeln!(f, "  Anomaly Score: {:.4} (negative = anomalous)", self.result.score)?;
            writeln!(f, "  This reading differs significantly from normal patterns.")?;
        } else {
            writeln!(f, "  NORMAL READING")?;
            writeln!(f, "  Anomaly Score: {:.4} (non-negative = normal)", self.result.score)?;
            writeln!(f, "  This reading is within expected parameters.")?;
        }
        writeln!(f, "{rule}")
    }
}
