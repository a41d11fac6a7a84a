//! Training corpus ingestion
//!
//! The historical corpus is a CSV export with one reading per row. Exports
//! come from spreadsheet tools, so headers vary in case and decoration
//! (`Temperature (°C)`, `pH Level`) and may be Latin-1 encoded. Columns are
//! matched on a normalized key and cells are decoded lossily.
//!
//! Rows with a missing, non-numeric or non-finite channel are dropped and
//! counted rather than failing the whole load.

use std::{fs::File, io::Read, path::Path};

use csv::{ByteRecord, ReaderBuilder};

use growguard_core::{parse_channel, ReadingResult};

use crate::{Channel, MLError, MLResult, SensorReading};

/// Below this many rows the fitted model is unlikely to be stable
pub const MIN_STABLE_CORPUS_ROWS: usize = 20;

/// A reading with the metadata that travels with it
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedReading {
    /// Channel values
    pub reading: SensorReading,
    /// Plant identifier, if the source had one
    pub plant_id: Option<String>,
    /// Date or timestamp text, if the source had one
    pub date: Option<String>,
}

impl TaggedReading {
    /// Untagged reading
    pub fn new(reading: SensorReading) -> Self {
        Self {
            reading,
            plant_id: None,
            date: None,
        }
    }
}

/// One loosely typed row before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// Temperature cell
    pub temperature: Option<String>,
    /// Humidity cell
    pub humidity: Option<String>,
    /// pH cell
    pub ph: Option<String>,
    /// Plant identifier cell
    pub plant_id: Option<String>,
    /// Date cell
    pub date: Option<String>,
}

impl RawRecord {
    /// Validate into a tagged reading
    pub fn to_tagged(&self) -> ReadingResult<TaggedReading> {
        let cell = |channel: Channel, raw: &Option<String>| -> ReadingResult<f64> {
            parse_channel(channel, raw.as_deref().unwrap_or(""))
        };

        let reading = SensorReading::new(
            cell(Channel::Temperature, &self.temperature)?,
            cell(Channel::Humidity, &self.humidity)?,
            cell(Channel::Ph, &self.ph)?,
        )?;

        Ok(TaggedReading {
            reading,
            plant_id: non_empty(&self.plant_id),
            date: non_empty(&self.date),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Per-channel summary of a corpus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelDescription {
    /// Channel described
    pub channel: Channel,
    /// Number of values
    pub count: usize,
    /// Mean
    pub mean: f64,
    /// Sample standard deviation (n - 1), 0 for fewer than two rows
    pub std_dev: f64,
    /// Minimum
    pub min: f64,
    /// Maximum
    pub max: f64,
}

/// Validated readings ready for training or batch scoring
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingCorpus {
    rows: Vec<TaggedReading>,
    dropped_rows: usize,
}

impl TrainingCorpus {
    /// Corpus from already-validated rows
    pub fn new(rows: Vec<TaggedReading>) -> Self {
        Self { rows, dropped_rows: 0 }
    }

    /// Corpus from bare readings
    pub fn from_readings<I: IntoIterator<Item = SensorReading>>(readings: I) -> Self {
        Self::new(readings.into_iter().map(TaggedReading::new).collect())
    }

    /// Validate raw rows, dropping and counting the invalid ones
    pub fn from_records<I: IntoIterator<Item = RawRecord>>(records: I) -> Self {
        let mut corpus = Self::default();
        for (line, record) in records.into_iter().enumerate() {
            corpus.push_record(line + 1, &record);
        }
        corpus.finish()
    }

    /// Load a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> MLResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| MLError::Corpus(format!("cannot open {}: {e}", path.display())))?;
        log::info!("Loading corpus from {}", path.display());
        Self::from_csv_reader(file)
    }

    /// Load CSV data from any reader
    ///
    /// The header row must name temperature, humidity and pH columns. Plant
    /// id and date columns are optional.
    pub fn from_csv_reader<R: Read>(reader: R) -> MLResult<Self> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

        let columns = ColumnMap::from_headers(reader.byte_headers()?)?;

        let mut corpus = Self::default();
        let mut record = ByteRecord::new();
        let mut line = 1;
        while reader.read_byte_record(&mut record)? {
            line += 1;
            corpus.push_record(line, &columns.extract(&record));
        }

        Ok(corpus.finish())
    }

    fn push_record(&mut self, line: usize, record: &RawRecord) {
        match record.to_tagged() {
            Ok(tagged) => self.rows.push(tagged),
            Err(e) => {
                log::debug!("Dropping row {line}: {e}");
                self.dropped_rows += 1;
            }
        }
    }

    fn finish(self) -> Self {
        if self.dropped_rows > 0 {
            log::info!(
                "Kept {} rows, dropped {} rows with invalid channels",
                self.rows.len(),
                self.dropped_rows
            );
        }
        if !self.rows.is_empty() && self.rows.len() < MIN_STABLE_CORPUS_ROWS {
            log::warn!(
                "Corpus has only {} rows; a model trained on fewer than {} rows may be unstable",
                self.rows.len(),
                MIN_STABLE_CORPUS_ROWS
            );
        }
        self
    }

    /// Validated rows
    pub fn rows(&self) -> &[TaggedReading] {
        &self.rows
    }

    /// Readings without metadata
    pub fn readings(&self) -> Vec<SensorReading> {
        self.rows.iter().map(|r| r.reading).collect()
    }

    /// Number of rows rejected during ingestion
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Number of valid rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no valid rows remain
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Summary statistics per channel, `None` when empty
    pub fn describe(&self) -> Option<[ChannelDescription; 3]> {
        if self.rows.is_empty() {
            return None;
        }

        let count = self.rows.len();
        Some(Channel::ALL.map(|channel| {
            let values = self.rows.iter().map(|r| r.reading.get(channel));
            let mean = values.clone().sum::<f64>() / count as f64;
            let std_dev = if count > 1 {
                (values.clone().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
            } else {
                0.0
            };
            let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });

            ChannelDescription {
                channel,
                count,
                mean,
                std_dev,
                min,
                max,
            }
        }))
    }
}

/// Positions of the recognized columns in a header row
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    temperature: usize,
    humidity: usize,
    ph: usize,
    plant_id: Option<usize>,
    date: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &ByteRecord) -> MLResult<Self> {
        let mut temperature = None;
        let mut humidity = None;
        let mut ph = None;
        let mut plant_id = None;
        let mut date = None;

        for (index, raw) in headers.iter().enumerate() {
            let key = header_key(raw);
            let slot = if key.starts_with("temp") {
                &mut temperature
            } else if key.starts_with("humid") {
                &mut humidity
            } else if key == "ph" || key.starts_with("phlevel") || key.starts_with("phvalue") {
                &mut ph
            } else if key == "plantid" || key == "plant" {
                &mut plant_id
            } else if key == "date" || key == "timestamp" {
                &mut date
            } else {
                continue;
            };
            slot.get_or_insert(index);
        }

        let require = |slot: Option<usize>, channel: Channel| {
            slot.ok_or_else(|| MLError::Corpus(format!("missing {} column in header", channel.name())))
        };

        Ok(Self {
            temperature: require(temperature, Channel::Temperature)?,
            humidity: require(humidity, Channel::Humidity)?,
            ph: require(ph, Channel::Ph)?,
            plant_id,
            date,
        })
    }

    fn extract(&self, record: &ByteRecord) -> RawRecord {
        let cell = |index: usize| record.get(index).map(|b| String::from_utf8_lossy(b).into_owned());

        RawRecord {
            temperature: cell(self.temperature),
            humidity: cell(self.humidity),
            ph: cell(self.ph),
            plant_id: self.plant_id.and_then(cell),
            date: self.date.and_then(cell),
        }
    }
}

/// Lowercase alphanumeric form of a header cell
fn header_key(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Plant_ID,Date,Temperature (°C),Humidity (%),pH Level
1,2024-10-03,23.1,65.2,6.4
2,2024-10-03,24.0,n/a,6.1
3,2024-10-04,22.8,63.9,6.6
4,2024-10-04,,64.0,6.5
";

    #[test]
    fn loads_and_drops_invalid_rows() {
        let corpus = TrainingCorpus::from_csv_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.dropped_rows(), 2);

        let first = &corpus.rows()[0];
        assert_eq!(first.plant_id.as_deref(), Some("1"));
        assert_eq!(first.date.as_deref(), Some("2024-10-03"));
        assert_eq!(first.reading.ph(), 6.4);
    }

    #[test]
    fn latin1_headers_are_recognized() {
        let mut data = b"Temperature (".to_vec();
        data.push(0xB0); // Latin-1 degree sign
        data.extend_from_slice(b"C),Humidity (%),pH Level\n21.0,60.0,6.0\n");

        let corpus = TrainingCorpus::from_csv_reader(data.as_slice()).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.rows()[0].plant_id, None);
    }

    #[test]
    fn missing_channel_column_is_an_error() {
        let err = TrainingCorpus::from_csv_reader("temperature,humidity\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MLError::Corpus(msg) if msg.contains("ph")));
    }

    #[test]
    fn records_are_validated() {
        let corpus = TrainingCorpus::from_records([
            RawRecord {
                temperature: Some("22".into()),
                humidity: Some(" 61.5 ".into()),
                ph: Some("6.2".into()),
                plant_id: Some("  ".into()),
                ..RawRecord::default()
            },
            RawRecord {
                temperature: Some("NaN".into()),
                humidity: Some("61".into()),
                ph: Some("6.2".into()),
                ..RawRecord::default()
            },
        ]);

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.dropped_rows(), 1);
        assert_eq!(corpus.rows()[0].reading.humidity(), 61.5);
        assert_eq!(corpus.rows()[0].plant_id, None);
    }

    #[test]
    fn describe_uses_sample_deviation() {
        let corpus = TrainingCorpus::from_readings([
            SensorReading::new(20.0, 60.0, 6.0).unwrap(),
            SensorReading::new(22.0, 70.0, 7.0).unwrap(),
        ]);

        let [t, _, ph] = corpus.describe().unwrap();
        assert_eq!(t.mean, 21.0);
        assert!((t.std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(ph.min, 6.0);
        assert_eq!(ph.max, 7.0);
        assert!(TrainingCorpus::default().describe().is_none());
    }
}
