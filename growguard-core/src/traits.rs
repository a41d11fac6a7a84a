//! Core traits for validators
//!
//! These traits define the interface all channel validators implement.
//! Keep them simple - the fallback path runs on the same devices as the sensors.

use crate::errors::ValidationResult;

/// Core validator trait - implement this for each sensor channel
pub trait Validator {
    /// The type of value this validator handles
    type Value;

    /// Validate a single reading
    fn validate(&self, value: Self::Value) -> ValidationResult<()>;

    /// Get plausibility constraints for this validator
    fn constraints(&self) -> ValidatorConstraints;
}

/// Plausibility constraints for a validator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorConstraints {
    /// Minimum plausible value
    pub min_value: f64,

    /// Maximum plausible value
    pub max_value: f64,
}

/// Trait for values that can be validated
pub trait Validatable {
    /// Check if the value is a usable number (not NaN, infinite, etc)
    fn is_valid(&self) -> bool;
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}
