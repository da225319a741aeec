//! Store Module
//!
//! The key-value backend abstraction every component of the caching layer is
//! built on, plus a Redis implementation and an in-process implementation.
//!
//! Each command is atomic on its own. Nothing here groups commands into
//! transactions.

mod entry;
mod keyspace;
mod memory;
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

pub use entry::{StoreEntry, StoredData};
pub use keyspace::Keyspace;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

// == KvStore ==
/// A key-value backend addressed by opaque string keys.
///
/// Values are byte strings. Implementations must report a missing or expired
/// key as `Ok(None)` (or an empty list), never as an error.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// A name for logging.
    fn name(&self) -> &'static str;

    /// Reads the byte string at `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes `value` at `key` with no expiration, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Writes `value` at `key`, expiring after `ttl_secs` seconds.
    async fn setex(&self, key: &str, ttl_secs: u64, value: &[u8]) -> Result<()>;

    /// Increments the integer at `key` and returns the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Appends `value` to the list at `key`, returning the new length.
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize>;

    /// Reads the inclusive range `start..=stop` of the list at `key`.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Erases every key in the database.
    async fn flushdb(&self) -> Result<()>;
}

/// Store handle shared by every component built over the same backend.
pub type SharedStore = Arc<dyn KvStore>;
