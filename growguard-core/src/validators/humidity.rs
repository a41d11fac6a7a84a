//! Relative humidity validator
//!
//! Relative humidity is a ratio, so anything outside 0-100% cannot come from a
//! healthy sensor. Capacitive sensors drift slightly negative when very dry and
//! read a little above 100% in condensing air; both cases are reported so the
//! probe gets checked.

use crate::{
    errors::ValidationResult,
    traits::{Validator, ValidatorConstraints},
};

use super::utils;

/// Lowest valid relative humidity (%)
pub const HUMIDITY_MIN: f64 = 0.0;

/// Highest valid relative humidity (%)
pub const HUMIDITY_MAX: f64 = 100.0;

/// Humidity validator for percent readings
#[derive(Debug, Clone)]
pub struct HumidityValidator {
    min_percent: f64,
    max_percent: f64,
}

impl Default for HumidityValidator {
    fn default() -> Self {
        Self {
            min_percent: HUMIDITY_MIN,
            max_percent: HUMIDITY_MAX,
        }
    }
}

impl HumidityValidator {
    /// Create validator with custom limits, clamped to the definitional 0-100%
    pub fn new_with_limits(min: f64, max: f64) -> Self {
        let (min, max) = utils::ordered_limits(min, max);

        Self {
            min_percent: min.max(HUMIDITY_MIN),
            max_percent: max.min(HUMIDITY_MAX),
        }
    }
}

impl Validator for HumidityValidator {
    type Value = f64;

    fn validate(&self, value: Self::Value) -> ValidationResult<()> {
        utils::check_range(value, self.min_percent, self.max_percent)
    }

    fn constraints(&self) -> ValidatorConstraints {
        ValidatorConstraints {
            min_value: self.min_percent,
            max_value: self.max_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humidity_bounds() {
        let validator = HumidityValidator::default();

        assert!(validator.validate(65.0).is_ok());
        assert!(validator.validate(0.0).is_ok());
        assert!(validator.validate(100.0).is_ok());
        assert!(validator.validate(-0.5).is_err());
        assert!(validator.validate(101.0).is_err());
    }

    #[test]
    fn custom_limits_stay_within_definition() {
        let validator = HumidityValidator::new_with_limits(-10.0, 120.0);
        let constraints = validator.constraints();

        assert_eq!(constraints.min_value, 0.0);
        assert_eq!(constraints.max_value, 100.0);
    }
}
