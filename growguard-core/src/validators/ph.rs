//! Nutrient solution pH validator
//!
//! ## Background
//!
//! pH is a logarithmic scale from 0 to 14. Most hydroponic crops want a
//! solution between 5.5 and 6.5 and tolerate roughly 6.0-7.5; outside 4-9 the
//! roots are damaged within hours and nutrient lockout is certain.
//!
//! Readings outside 4-9 usually mean one of:
//! - A dosing pump stuck open (acid or base)
//! - A probe that dried out or needs recalibration
//! - A reservoir that was topped up with untreated water
//!
//! The validator only answers "is this plausible for a running system".
//! Whether a plausible value is unusual for *this* system is the statistical
//! model's job.

use crate::{
    errors::ValidationResult,
    traits::{Validator, ValidatorConstraints},
};

use super::utils;

/// Lowest tolerable solution pH
pub const PH_MIN: f64 = 4.0;

/// Highest tolerable solution pH
pub const PH_MAX: f64 = 9.0;

/// Limits of the pH scale itself
const PH_SCALE: (f64, f64) = (0.0, 14.0);

/// pH validator
#[derive(Debug, Clone)]
pub struct PhValidator {
    min_ph: f64,
    max_ph: f64,
}

impl Default for PhValidator {
    fn default() -> Self {
        Self {
            min_ph: PH_MIN,
            max_ph: PH_MAX,
        }
    }
}

impl PhValidator {
    /// Create validator with custom limits, clamped to the 0-14 scale
    pub fn new_with_limits(min: f64, max: f64) -> Self {
        let (min, max) = utils::ordered_limits(min, max);

        Self {
            min_ph: min.max(PH_SCALE.0),
            max_ph: max.min(PH_SCALE.1),
        }
    }
}

impl Validator for PhValidator {
    type Value = f64;

    fn validate(&self, value: Self::Value) -> ValidationResult<()> {
        utils::check_range(value, self.min_ph, self.max_ph)
    }

    fn constraints(&self) -> ValidatorConstraints {
        ValidatorConstraints {
            min_value: self.min_ph,
            max_value: self.max_ph,
        }
    }
}
