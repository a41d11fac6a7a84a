//! HTTP connector for uploading readings to the GrowGuard API
//!
//! ## Overview
//!
//! Posts each reading as JSON to `{base_url}/api/sensor-data` and returns the
//! server's verdict. The node is a small single-threaded loop, so the client
//! is blocking (`ureq`) and waits a fixed delay between attempts.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use growguard_connectors::http::{HttpConfig, HttpConnector};
//!
//! let config = HttpConfig::new("http://192.168.1.100:5000")
//!     .timeout_secs(5)
//!     .max_attempts(3)
//!     .retry_delay(Duration::from_secs(2));
//!
//! let connector = HttpConnector::new(config)?;
//! # Ok::<(), growguard_connectors::http::HttpError>(())
//! ```

use std::{collections::HashMap, thread, time::Duration};

use thiserror::Error;

use crate::{Ack, ConnectionStats, Connector, OutgoingReading};

/// Ingestion endpoint path
pub const SENSOR_DATA_PATH: &str = "/api/sensor-data";

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(String),

    /// Server returned error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HttpError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::Request(_) => true,
            HttpError::ServerError { status, .. } => *status >= 500 || *status == 429,
            HttpError::Serialization(_) | HttpError::Config(_) => false,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Base URL of the server, without trailing path
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Attempts per reading, including the first
    pub max_attempts: u32,
    /// Wait between attempts
    pub retry_delay: Duration,
    /// User agent string
    pub user_agent: String,
}

impl HttpConfig {
    /// Create new configuration with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: Duration::from_secs(5),
            headers: HashMap::new(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            user_agent: format!("GrowGuard-Node/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set attempts per reading
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the wait between attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// HTTP connector using lightweight ureq client
pub struct HttpConnector {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: ConnectionStats,
}

impl HttpConnector {
    /// Create new HTTP connector
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HttpError::Config("Base URL must start with http:// or https://".into()));
        }
        if config.max_attempts == 0 {
            return Err(HttpError::Config("max_attempts must be at least 1".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: ConnectionStats::default(),
        })
    }

    /// Full URL of the ingestion endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.config.base_url, SENSOR_DATA_PATH)
    }

    fn build_request(&self, url: &str) -> ureq::Request {
        let mut request = self.agent.post(url);
        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }
        request
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
    }

    /// One POST, mapping every failure into `HttpError`
    fn post_once(&self, url: &str, body: &str) -> Result<Ack, HttpError> {
        match self.build_request(url).send_string(body) {
            Ok(response) => {
                let text = response
                    .into_string()
                    .map_err(|e| HttpError::Request(e.to_string()))?;
                serde_json::from_str(&text).map_err(|e| HttpError::Serialization(e.to_string()))
            }
            Err(ureq::Error::Status(status, response)) => Err(HttpError::ServerError {
                status,
                message: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(e)) => Err(HttpError::Request(e.to_string())),
        }
    }

    /// Execute request with retry logic
    fn execute_with_retry(&mut self, body: &str) -> Result<Ack, HttpError> {
        let url = self.endpoint();
        let attempts = self.config.max_attempts;

        for attempt in 1..=attempts {
            match self.post_once(&url, body) {
                Ok(ack) => {
                    self.stats.messages_sent += 1;
                    self.stats.bytes_sent += body.len() as u64;
                    return Ok(ack);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    log::warn!("Upload attempt {attempt}/{attempts} failed: {e}; retrying");
                    self.stats.retries += 1;
                    self.stats.last_error = Some(e.to_string());
                    thread::sleep(self.config.retry_delay);
                }
                Err(e) => {
                    log::error!("Upload failed after {attempt} attempt(s): {e}");
                    self.stats.messages_failed += 1;
                    self.stats.last_error = Some(e.to_string());
                    return Err(e);
                }
            }
        }

        // max_attempts >= 1 is checked in `new`
        Err(HttpError::Config("no attempts configured".into()))
    }
}

impl Connector for HttpConnector {
    type Error = HttpError;

    fn send(&mut self, reading: &OutgoingReading) -> Result<Ack, Self::Error> {
        let body = serde_json::to_string(reading).map_err(|e| HttpError::Serialization(e.to_string()))?;
        let ack = self.execute_with_retry(&body)?;
        log::info!("Reading uploaded for {}: {}", reading.plant_id, ack.status);
        Ok(ack)
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.clone()
    }
}
