//! Sensor reading model
//!
//! A reading is the ordered triple the whole system works with: air temperature
//! in °C, relative humidity in % and nutrient solution pH. Plant identifiers and
//! timestamps travel next to a reading but are never inputs to scoring, so they
//! live with the callers that need them.

use crate::errors::{ReadingError, ReadingResult};
use crate::traits::Validatable;

/// Number of channels in a reading
pub const FEATURE_COUNT: usize = 3;

/// One sensor channel, in feature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Channel {
    /// Air temperature (°C)
    Temperature,
    /// Relative humidity (%)
    Humidity,
    /// Solution pH (0-14)
    Ph,
}

impl Channel {
    /// All channels in feature-vector order
    pub const ALL: [Channel; FEATURE_COUNT] = [Channel::Temperature, Channel::Humidity, Channel::Ph];

    /// Position of this channel in a feature vector
    pub const fn index(self) -> usize {
        match self {
            Channel::Temperature => 0,
            Channel::Humidity => 1,
            Channel::Ph => 2,
        }
    }

    /// Field name used in JSON payloads and error messages
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::Ph => "ph",
        }
    }

    /// Unit suffix for reports
    pub const fn unit(self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            Channel::Humidity => "%",
            Channel::Ph => "",
        }
    }
}

/// A validated (finite) temperature/humidity/pH triple
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SensorReading {
    temperature: f64,
    humidity: f64,
    ph: f64,
}

impl SensorReading {
    /// Build a reading, rejecting NaN and infinite channels
    pub fn new(temperature: f64, humidity: f64, ph: f64) -> ReadingResult<Self> {
        let values = [temperature, humidity, ph];
        for channel in Channel::ALL {
            if !values[channel.index()].is_valid() {
                return Err(ReadingError::NonFinite { field: channel.name() });
            }
        }

        Ok(Self { temperature, humidity, ph })
    }

    /// Build a reading from optional channel values, as produced by loosely
    /// typed sources (CSV cells, JSON fields)
    pub fn from_parts(
        temperature: Option<f64>,
        humidity: Option<f64>,
        ph: Option<f64>,
    ) -> ReadingResult<Self> {
        let temperature = temperature.ok_or(ReadingError::MissingField { field: "temperature" })?;
        let humidity = humidity.ok_or(ReadingError::MissingField { field: "humidity" })?;
        let ph = ph.ok_or(ReadingError::MissingField { field: "ph" })?;
        Self::new(temperature, humidity, ph)
    }

    /// Air temperature in °C
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Relative humidity in %
    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    /// Solution pH
    pub fn ph(&self) -> f64 {
        self.ph
    }

    /// Value of a single channel
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::Ph => self.ph,
        }
    }

    /// Raw feature vector in channel order
    pub fn to_features(&self) -> [f64; FEATURE_COUNT] {
        [self.temperature, self.humidity, self.ph]
    }
}

/// Parse a text cell into a channel value
///
/// Surrounding whitespace is ignored. Empty cells count as missing.
pub fn parse_channel(channel: Channel, raw: &str) -> ReadingResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ReadingError::MissingField { field: channel.name() });
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| ReadingError::NotNumeric { field: channel.name() })?;

    if !value.is_valid() {
        return Err(ReadingError::NonFinite { field: channel.name() });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_reading() {
        let reading = SensorReading::new(23.0, 65.0, 6.4).unwrap();
        assert_eq!(reading.to_features(), [23.0, 65.0, 6.4]);
        assert_eq!(reading.get(Channel::Ph), 6.4);
    }

    #[test]
    fn rejects_non_finite() {
        assert_eq!(
            SensorReading::new(f64::INFINITY, 65.0, 6.4),
            Err(ReadingError::NonFinite { field: "temperature" })
        );
        assert_eq!(
            SensorReading::new(23.0, 65.0, f64::NAN),
            Err(ReadingError::NonFinite { field: "ph" })
        );
    }

    #[test]
    fn missing_parts() {
        assert_eq!(
            SensorReading::from_parts(Some(23.0), None, Some(6.4)),
            Err(ReadingError::MissingField { field: "humidity" })
        );
    }

    #[test]
    fn parse_cells() {
        assert_eq!(parse_channel(Channel::Ph, " 6.5 "), Ok(6.5));
        assert_eq!(
            parse_channel(Channel::Temperature, "warm"),
            Err(ReadingError::NotNumeric { field: "temperature" })
        );
        assert_eq!(
            parse_channel(Channel::Humidity, ""),
            Err(ReadingError::MissingField { field: "humidity" })
        );
        assert_eq!(
            parse_channel(Channel::Humidity, "NaN"),
            Err(ReadingError::NonFinite { field: "humidity" })
        );
    }

    #[test]
    fn channel_order() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }
}
