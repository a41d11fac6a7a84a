//! Error Types for Reading Ingestion and Bounds Validation
//!
//! ## Design Philosophy
//!
//! GrowGuard's core errors follow the same rules as the rest of the edge stack:
//!
//! 1. **No Heap Allocation**: All error data is inline. Field names are
//!    `&'static str` so the core stays usable without an allocator.
//!
//! 2. **Copy Semantics**: Errors implement Copy so they can be returned from the
//!    hot path and stored in per-request results cheaply.
//!
//! 3. **Actionable Information**: Each error names the channel that failed, which
//!    is exactly what the serving boundary reports back to the sensor node.
//!
//! ## Error Categories
//!
//! ### Ingestion Failures (`ReadingError`)
//! - `MissingField`: a required channel is absent from the payload or row
//! - `NotNumeric`: the field is present but cannot be read as a number
//! - `NonFinite`: the field parsed to NaN or infinity
//!
//! A reading that fails ingestion is never scored. At serving time this maps to
//! a 400 response; during training the row is dropped.
//!
//! ### Bounds Violations (`ValidationError`)
//! - `OutOfRange`: value outside the plausible range for the channel
//! - `InvalidValue`: NaN or infinity reached a validator
//!
//! Bounds violations feed the rule-based fallback scorer; they are a verdict,
//! not a rejection.
//!
//! ```rust
//! use growguard_core::{ReadingError, SensorReading};
//!
//! match SensorReading::new(22.0, f64::NAN, 6.2) {
//!     Ok(_) => unreachable!(),
//!     Err(ReadingError::NonFinite { field }) => assert_eq!(field, "humidity"),
//!     Err(other) => panic!("unexpected: {other}"),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for bounds validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for reading ingestion
pub type ReadingResult<T> = Result<T, ReadingError>;

/// A reading could not be accepted for scoring
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingError {
    /// Required field is absent
    #[error("Missing field: {field}")]
    MissingField {
        /// Name of the missing channel
        field: &'static str,
    },

    /// Field present but not a number
    #[error("Invalid data format: {field} is not numeric")]
    NotNumeric {
        /// Name of the offending channel
        field: &'static str,
    },

    /// Field parsed but is NaN or infinite
    #[error("Invalid data format: {field} is not a finite number")]
    NonFinite {
        /// Name of the offending channel
        field: &'static str,
    },
}

impl ReadingError {
    /// Channel name the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } | Self::NotNumeric { field } | Self::NonFinite { field } => {
                field
            }
        }
    }
}

/// Bounds validation errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Value outside plausible limits
    #[error("Value {value} outside range [{min}, {max}]")]
    OutOfRange {
        /// The reading that failed validation
        value: f64,
        /// Minimum plausible value
        min: f64,
        /// Maximum plausible value
        max: f64,
    },

    /// Value makes no physical sense (NaN, infinity)
    #[error("Invalid value: not a valid number")]
    InvalidValue,
}
