//! Temperature validator for grow-room air
//!
//! Validates temperature readings against the range a hydroponic grow room can
//! plausibly reach. Anything outside it is either a failed probe or a climate
//! control failure, and both deserve an alert.

use crate::{
    errors::ValidationResult,
    traits::{Validator, ValidatorConstraints},
};

use super::utils;

/// Lowest plausible grow-room temperature (°C)
pub const TEMP_MIN_CELSIUS: f64 = 0.0;

/// Highest plausible grow-room temperature (°C)
pub const TEMP_MAX_CELSIUS: f64 = 50.0;

/// Temperature validator for Celsius readings
#[derive(Debug, Clone)]
pub struct TemperatureValidator {
    /// Minimum valid temperature in Celsius
    min_celsius: f64,

    /// Maximum valid temperature in Celsius
    max_celsius: f64,
}

impl Default for TemperatureValidator {
    fn default() -> Self {
        Self {
            // Below freezing the nutrient solution is at risk
            min_celsius: TEMP_MIN_CELSIUS,
            // Indoor plants do not survive sustained air above 50°C
            max_celsius: TEMP_MAX_CELSIUS,
        }
    }
}

impl TemperatureValidator {
    /// Create validator with custom limits
    pub fn new_with_limits(min: f64, max: f64) -> Self {
        let (min, max) = utils::ordered_limits(min, max);

        Self {
            min_celsius: min.max(-273.15), // Can't go below absolute zero
            max_celsius: max,
        }
    }
}

impl Validator for TemperatureValidator {
    type Value = f64;

    fn validate(&self, value: Self::Value) -> ValidationResult<()> {
        utils::check_range(value, self.min_celsius, self.max_celsius)
    }

    fn constraints(&self) -> ValidatorConstraints {
        ValidatorConstraints {
            min_value: self.min_celsius,
            max_value: self.max_celsius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn valid_temperature() {
        let validator = TemperatureValidator::default();
        assert!(validator.validate(22.5).is_ok());
    }

    #[test]
    fn temperature_out_of_range() {
        let validator = TemperatureValidator::default();

        assert!(validator.validate(-5.0).is_err());
        assert!(matches!(
            validator.validate(100.0),
            Err(ValidationError::OutOfRange { value, .. }) if value == 100.0
        ));
    }

    #[test]
    fn custom_limits_are_ordered() {
        let validator = TemperatureValidator::new_with_limits(30.0, 10.0);
        let constraints = validator.constraints();

        assert_eq!(constraints.min_value, 10.0);
        assert_eq!(constraints.max_value, 30.0);
    }

    #[test]
    fn custom_limits_clamp_absolute_zero() {
        let validator = TemperatureValidator::new_with_limits(-500.0, 10.0);
        assert_eq!(validator.constraints().min_value, -273.15);
    }
}
