//! Rule-based fallback scoring
//!
//! When the serving process has no trained model (artifacts missing or
//! corrupt) it still has to answer every request. The fallback checks each
//! channel against its plausibility bounds and reports the fraction of
//! channels out of range:
//!
//! ```text
//! violations  score   verdict
//!     0        0.00   normal
//!     1        0.33   anomaly
//!     2        0.67   anomaly
//!     3        1.00   anomaly
//! ```
//!
//! The bounds are independent of the statistical model's decision boundary and
//! the two can disagree on the same reading. `ScoreResult::source` tells
//! callers which convention a score follows.

use crate::{
    errors::ValidationError,
    reading::{Channel, SensorReading, FEATURE_COUNT},
    score::ScoreResult,
    traits::Validator,
    validators::{HumidityValidator, PhValidator, TemperatureValidator},
};

/// A single out-of-bounds channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsViolation {
    /// Channel that failed
    pub channel: Channel,
    /// Underlying validation error
    pub error: ValidationError,
}

/// Rule-based scorer built from the per-channel validators
#[derive(Debug, Clone, Default)]
pub struct RuleBasedScorer {
    temperature: TemperatureValidator,
    humidity: HumidityValidator,
    ph: PhValidator,
}

impl RuleBasedScorer {
    fn check(&self, channel: Channel, value: f64) -> Result<(), ValidationError> {
        match channel {
            Channel::Temperature => self.temperature.validate(value),
            Channel::Humidity => self.humidity.validate(value),
            Channel::Ph => self.ph.validate(value),
        }
    }

    /// Channels violating their bounds, in channel order
    pub fn violations(&self, reading: &SensorReading) -> impl Iterator<Item = BoundsViolation> + '_ {
        let reading = *reading;
        Channel::ALL.into_iter().filter_map(move |channel| {
            self.check(channel, reading.get(channel))
                .err()
                .map(|error| BoundsViolation { channel, error })
        })
    }

    /// Score a reading: anomaly when any bound is violated, score is the
    /// violated fraction of channels
    pub fn score(&self, reading: &SensorReading) -> ScoreResult {
        let violated = self.violations(reading).count();

        if violated > 0 {
            #[cfg(feature = "log")]
            log::debug!("Rule-based check: {} of {} channels out of bounds", violated, FEATURE_COUNT);
        }

        ScoreResult::from_rules(violated > 0, violated as f64 / FEATURE_COUNT as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::ScoreSource;

    fn reading(t: f64, h: f64, ph: f64) -> SensorReading {
        SensorReading::new(t, h, ph).unwrap()
    }

    #[test]
    fn normal_reading_passes() {
        let scorer = RuleBasedScorer::default();
        let result = scorer.score(&reading(23.0, 65.0, 6.4));

        assert!(!result.is_anomaly);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.source, ScoreSource::RuleBased);
    }

    #[test]
    fn hot_reading_is_anomalous() {
        let scorer = RuleBasedScorer::default();
        let result = scorer.score(&reading(100.0, 60.0, 6.5));

        assert!(result.is_anomaly);
        assert!((result.score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[cfg(feature = "std")]
    #[test]
    fn violations_name_the_channel() {
        let scorer = RuleBasedScorer::default();
        let channels: std::vec::Vec<Channel> = scorer
            .violations(&reading(100.0, 60.0, 6.5))
            .map(|v| v.channel)
            .collect();

        assert_eq!(channels, [Channel::Temperature]);
    }

    #[test]
    fn all_channels_violated() {
        let scorer = RuleBasedScorer::default();
        let result = scorer.score(&reading(-5.0, 120.0, 12.0));

        assert!(result.is_anomaly);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn bounds_are_inclusive() {
        let scorer = RuleBasedScorer::default();
        assert!(!scorer.score(&reading(0.0, 100.0, 9.0)).is_anomaly);
        assert!(!scorer.score(&reading(50.0, 0.0, 4.0)).is_anomaly);
    }
}
