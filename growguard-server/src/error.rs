//! API error type and its HTTP mapping
//!
//! Every error leaves the server as `{"error": "<message>"}` with a status
//! matching its cause.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use growguard_core::ReadingError;
use serde_json::json;
use thiserror::Error;

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Reading failed field validation
    #[error(transparent)]
    InvalidReading(#[from] ReadingError),

    /// Body or query could not be interpreted
    #[error("{0}")]
    BadRequest(String),

    /// Nothing matches the request
    #[error("{0}")]
    NotFound(String),

    /// Artifacts could not be loaded
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidReading(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
