//! Store Entry Module
//!
//! Defines the structure for individual keyspace entries with TTL support.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CacheError, Result};

// == Stored Data ==
/// The payload held under a key: a byte string or a list of byte strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredData {
    /// Plain value written by `set`/`setex`/`incr`
    Bytes(Vec<u8>),
    /// List value built by `rpush`
    List(Vec<Vec<u8>>),
}

// == Store Entry ==
/// Represents a single keyspace entry with data and metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored data
    pub data: StoredData,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates an entry that never expires.
    pub fn persistent(data: StoredData) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    /// Creates an entry expiring `ttl_seconds` from now.
    ///
    /// Fails when the expiration instant does not fit a millisecond timestamp.
    pub fn expiring(data: StoredData, ttl_seconds: u64) -> Result<Self> {
        let expires_at = ttl_seconds
            .checked_mul(1000)
            .and_then(|ttl_ms| current_timestamp_ms().checked_add(ttl_ms))
            .ok_or_else(|| {
                CacheError::InvalidRequest(format!(
                    "invalid expire time in 'setex' command: {ttl_seconds}"
                ))
            })?;

        Ok(Self {
            data,
            expires_at: Some(expires_at),
        })
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
