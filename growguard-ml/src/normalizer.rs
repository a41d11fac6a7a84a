//! Per-channel standardization
//!
//! Channels live on very different scales (pH around 6, humidity around 65),
//! so readings are standardized before they reach the forest:
//!
//! ```text
//! z = (x - mean) / std_dev        std_dev is the population deviation
//! ```

use serde::{Deserialize, Serialize};

use crate::{Channel, MLError, MLResult, Sample, SensorReading, FEATURE_COUNT};

/// Mean and population standard deviation of one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Mean
    pub mean: f64,
    /// Population standard deviation, always positive
    pub std_dev: f64,
}

/// Fitted scaler parameters, one entry per channel in channel order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParameters {
    channels: [ChannelStats; FEATURE_COUNT],
}

impl NormalizationParameters {
    /// Fit on a non-empty set of readings
    ///
    /// Fails with `DegenerateFeature` when every value of a channel is
    /// identical, since that channel cannot be scaled.
    pub fn fit(readings: &[SensorReading]) -> MLResult<Self> {
        if readings.is_empty() {
            return Err(MLError::EmptyCorpus);
        }

        let n = readings.len() as f64;
        let mut channels = [ChannelStats { mean: 0.0, std_dev: 1.0 }; FEATURE_COUNT];

        for channel in Channel::ALL {
            let values = readings.iter().map(|r| r.get(channel));

            let (min, max) = values
                .clone()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
            if min == max {
                return Err(MLError::DegenerateFeature { channel: channel.name() });
            }

            let mean = values.clone().sum::<f64>() / n;
            let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            if !(std_dev > 0.0 && std_dev.is_finite()) {
                return Err(MLError::DegenerateFeature { channel: channel.name() });
            }

            channels[channel.index()] = ChannelStats { mean, std_dev };
        }

        Ok(Self { channels })
    }

    /// Stats for one channel
    pub fn channel(&self, channel: Channel) -> ChannelStats {
        self.channels[channel.index()]
    }

    /// Standardize a reading into a forest sample
    pub fn transform(&self, reading: &SensorReading) -> Sample {
        let mut sample = reading.to_features();
        for (value, stats) in sample.iter_mut().zip(&self.channels) {
            *value = (*value - stats.mean) / stats.std_dev;
        }
        sample
    }

    /// Standardize a batch
    pub fn transform_all(&self, readings: &[SensorReading]) -> Vec<Sample> {
        readings.iter().map(|r| self.transform(r)).collect()
    }

    /// Check values loaded from an artifact
    pub fn validate(&self) -> Result<(), String> {
        for channel in Channel::ALL {
            let stats = self.channel(channel);
            if !stats.mean.is_finite() {
                return Err(format!("{} mean is not finite", channel.name()));
            }
            if !(stats.std_dev > 0.0 && stats.std_dev.is_finite()) {
                return Err(format!("{} std_dev must be positive and finite", channel.name()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(rows: &[(f64, f64, f64)]) -> Vec<SensorReading> {
        rows.iter()
            .map(|&(t, h, ph)| SensorReading::new(t, h, ph).unwrap())
            .collect()
    }

    #[test]
    fn fits_population_statistics() {
        let params = NormalizationParameters::fit(&readings(&[
            (20.0, 60.0, 6.0),
            (22.0, 70.0, 7.0),
        ]))
        .unwrap();

        let t = params.channel(Channel::Temperature);
        assert_eq!(t.mean, 21.0);
        assert_eq!(t.std_dev, 1.0);

        let h = params.channel(Channel::Humidity);
        assert_eq!(h.mean, 65.0);
        assert_eq!(h.std_dev, 5.0);
    }

    #[test]
    fn transform_centres_and_scales() {
        let params = NormalizationParameters::fit(&readings(&[
            (20.0, 60.0, 6.0),
            (22.0, 70.0, 7.0),
        ]))
        .unwrap();

        let z = params.transform(&SensorReading::new(22.0, 60.0, 6.5).unwrap());
        assert_eq!(z, [1.0, -1.0, 0.0]);
    }

    #[test]
    fn constant_channel_is_degenerate() {
        let err = NormalizationParameters::fit(&readings(&[
            (20.0, 60.0, 6.4),
            (22.0, 70.0, 6.4),
            (24.0, 65.0, 6.4),
        ]))
        .unwrap_err();

        assert!(matches!(err, MLError::DegenerateFeature { channel: "ph" }));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(NormalizationParameters::fit(&[]), Err(MLError::EmptyCorpus)));
    }
}
