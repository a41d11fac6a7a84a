//! Core reading model for GrowGuard
//!
//! Handles the pieces of the hydroponic monitoring stack that must run
//! anywhere, including on the sensor node itself:
//!
//! - `SensorReading`: validated temperature / humidity / pH triple
//! - Channel bounds validators and the rule-based fallback scorer
//! - `ScoreResult`: the verdict/score pair every scorer returns
//! - `CircularBuffer`: bounded history of recent entries
//!
//! Key constraints:
//! - No heap allocation
//! - Usable without `std` (disable default features)
//! - Deterministic: same input, same output
//!
//! ```no_run
//! use growguard_core::{RuleBasedScorer, SensorReading};
//!
//! let scorer = RuleBasedScorer::default();
//! let reading = SensorReading::new(100.0, 60.0, 6.5)?;
//!
//! let result = scorer.score(&reading);
//! assert!(result.is_anomaly);
//! # Ok::<(), growguard_core::ReadingError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod buffer;
pub mod errors;
pub mod fallback;
pub mod reading;
pub mod score;
pub mod traits;
pub mod validators;

// Public API
pub use errors::{ReadingError, ReadingResult, ValidationError, ValidationResult};
pub use fallback::{BoundsViolation, RuleBasedScorer};
pub use reading::{parse_channel, Channel, SensorReading, FEATURE_COUNT};
pub use score::{ScoreResult, ScoreSource};
pub use traits::{Validatable, Validator, ValidatorConstraints};
pub use validators::{HumidityValidator, PhValidator, TemperatureValidator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
