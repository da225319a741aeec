//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror. A missing key is never an
//! error here: lookups return `Option` and callers treat `None` as a miss.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching layer.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The key-value backend could not be reached (connection, IO, timeout)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The backend rejected a command, e.g. a list operation on a string key
    #[error("Backend error: {0}")]
    Backend(String),

    /// Stored bytes could not be read as the requested type
    #[error("Coercion failed: {0}")]
    Coercion(String),

    /// Arguments or results could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An upstream HTTP fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

// == Conversions ==
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            CacheError::StorageUnavailable(err.to_string())
        } else {
            CacheError::Backend(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Fetch(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Coercion(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Fetch(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;
