//! Sensor-node connectors for pushing readings to a GrowGuard server
//!
//! ## Overview
//!
//! A sensor node samples its probes on a fixed interval and uploads each
//! reading to the serving process, which scores it and keeps it in history.
//! Nodes sit on flaky greenhouse WiFi, so every connector retries transient
//! failures and keeps counters the node can log.
//!
//! ## Retry Logic
//!
//! ```text
//! attempt 1 ── fail (transport / 5xx / 429) ── wait retry_delay ── attempt 2 ...
//!          └── fail (other 4xx) ── give up immediately
//! ```
//!
//! Client errors mean the payload itself is wrong; sending it again cannot
//! succeed.
//!
//! ## Example Usage
//!
//! ```no_run
//! use growguard_connectors::{http::{HttpConfig, HttpConnector}, Connector, OutgoingReading};
//! use growguard_core::SensorReading;
//!
//! let mut connector = HttpConnector::new(HttpConfig::new("http://192.168.1.100:5000"))?;
//! let reading = SensorReading::new(23.4, 64.0, 6.35)?;
//!
//! let ack = connector.send(&OutgoingReading::new(reading, "Plant-1"))?;
//! println!("server says {}", ack.status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HttpConfig, HttpConnector, HttpError};

use growguard_core::SensorReading;
use serde::{Deserialize, Serialize};

/// Plant id used when a node does not configure one
pub const DEFAULT_PLANT_ID: &str = "Plant-1";

/// Wire payload of one uploaded reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingReading {
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub plant_id: String,
}

impl OutgoingReading {
    /// Payload for a reading; temperature and humidity are rounded to two
    /// decimals and pH to four, matching probe precision
    pub fn new(reading: SensorReading, plant_id: impl Into<String>) -> Self {
        Self {
            temperature: round_to(reading.temperature(), 2),
            humidity: round_to(reading.humidity(), 2),
            ph: round_to(reading.ph(), 4),
            plant_id: plant_id.into(),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Server acknowledgement of an uploaded reading
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    /// "ANOMALY" or "NORMAL"
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub anomaly_score: Option<f64>,
}

/// Trait for all reading connectors
pub trait Connector {
    type Error;

    /// Upload one reading
    fn send(&mut self, reading: &OutgoingReading) -> Result<Ack, Self::Error>;

    /// Get connection statistics
    fn stats(&self) -> ConnectionStats;
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Attempts that were retried
    pub retries: u32,
    /// Last error message
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_rounded() {
        let reading = SensorReading::new(23.456, 64.999, 6.123456).unwrap();
        let payload = OutgoingReading::new(reading, DEFAULT_PLANT_ID);

        assert_eq!(payload.temperature, 23.46);
        assert_eq!(payload.humidity, 65.0);
        assert_eq!(payload.ph, 6.1235);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"temperature": 23.46, "humidity": 65.0, "ph": 6.1235, "plant_id": "Plant-1"})
        );
    }

    #[test]
    fn ack_tolerates_missing_fields() {
        let ack: Ack = serde_json::from_str(r#"{"success": true, "status": "NORMAL"}"#).unwrap();
        assert!(ack.success);
        assert_eq!(ack.anomaly_score, None);
    }
}
