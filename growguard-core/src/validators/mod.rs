//! Channel Bounds Validators
//!
//! ## Overview
//!
//! One validator per sensor channel. Each knows the range a working hydroponic
//! system can plausibly report:
//!
//! | Channel     | Range      | Why                                     |
//! |-------------|------------|-----------------------------------------|
//! | Temperature | 0-50 °C    | Indoor grow rooms, probe survival       |
//! | Humidity    | 0-100 %    | Definition of relative humidity         |
//! | pH          | 4-9        | Root damage and nutrient lockout beyond |
//!
//! These are hard plausibility limits, not the learned notion of "normal".
//! They back the rule-based fallback that the server uses when no trained
//! model is available:
//!
//! ```rust
//! use growguard_core::{Validator, PhValidator};
//!
//! let validator = PhValidator::default();
//! assert!(validator.validate(6.0).is_ok());
//! assert!(validator.validate(12.0).is_err());
//! ```

pub mod humidity;
pub mod ph;
pub mod temperature;
pub mod utils;

pub use humidity::HumidityValidator;
pub use ph::PhValidator;
pub use temperature::TemperatureValidator;
