//! Common Validation Utilities
//!
//! Shared helpers used by every channel validator so that range handling stays
//! consistent regardless of the sensor type.
//!
//! All utilities are pure functions with no side effects and no allocation,
//! which keeps them callable from interrupt context on the sensor node.
//!
//! ## Range Validation
//! The only check the fallback path needs - is the value plausible?
//! ```rust
//! use growguard_core::validators::utils::check_range;
//!
//! // Nutrient solution pH outside 4-9 means a dosing or probe failure
//! assert!(check_range(6.2, 4.0, 9.0).is_ok());
//! assert!(check_range(12.0, 4.0, 9.0).is_err());
//! ```
//!
//! Bounds are inclusive: a value sitting exactly on a limit is accepted.

use crate::errors::{ValidationError, ValidationResult};
use crate::traits::Validatable;

/// Check if a value is within the specified (inclusive) range
pub fn check_range(value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if !value.is_valid() {
        return Err(ValidationError::InvalidValue);
    }

    if value < min || value > max {
        Err(ValidationError::OutOfRange { value, min, max })
    } else {
        Ok(())
    }
}

/// Normalise a (min, max) pair so that min <= max
pub fn ordered_limits(min: f64, max: f64) -> (f64, f64) {
    if min > max {
        (max, min)
    } else {
        (min, max)
    }
}
