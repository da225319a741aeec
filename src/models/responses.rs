//! Response DTOs for the HTTP driver
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::Value;
use crate::instrument::{CallLog, CallRecord};

/// Response body for the STORE operation (PUT /store)
#[derive(Debug, Clone, Serialize)]
pub struct StoreResponse {
    /// Success message
    pub message: String,
    /// The generated key
    pub key: String,
}

impl StoreResponse {
    /// Creates a new StoreResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Value stored under '{}'", key),
            key,
        }
    }
}

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The coerced value, null when the key is absent
    pub value: Option<Value>,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the replay endpoint (GET /replay/:identity)
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResponse {
    /// The instrumented operation
    pub identity: String,
    /// Number of recorded calls
    pub calls: u64,
    /// Paired input/output entries, earliest first
    pub entries: Vec<CallRecord>,
    /// The rendered call log
    pub log: String,
}

impl From<CallLog> for ReplayResponse {
    fn from(log: CallLog) -> Self {
        Self {
            calls: log.call_count(),
            log: log.to_string(),
            identity: log.identity,
            entries: log.entries,
        }
    }
}

/// Response body for the page endpoint (GET /page)
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    /// The fetched URL
    pub url: String,
    /// The page body
    pub content: String,
    /// How many times this URL has been requested
    pub requests: u64,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Name of the backing store
    pub store: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(store: impl Into<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            store: store.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
