//! In-process backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{KvStore, Keyspace};

// == Memory Store ==
/// [`KvStore`] over a [`Keyspace`] guarded by an async lock.
///
/// Expired entries are unreadable immediately and physically removed either on
/// the next access or by [`spawn_cleanup_task`](crate::tasks::spawn_cleanup_task).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    keyspace: Arc<RwLock<Keyspace>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all expired entries, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        self.keyspace.write().await.purge_expired()
    }

    /// Number of entries currently held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.keyspace.read().await.len()
    }

    /// Returns true if no entries are held.
    pub async fn is_empty(&self) -> bool {
        self.keyspace.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // Write lock: reads drop expired entries
        self.keyspace.write().await.get(key)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.keyspace.write().await.set(key, value, None)
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &[u8]) -> Result<()> {
        self.keyspace.write().await.set(key, value, Some(ttl_secs))
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.keyspace.write().await.incr(key)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        self.keyspace.write().await.rpush(key, value)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        self.keyspace.write().await.lrange(key, start, stop)
    }

    async fn flushdb(&self) -> Result<()> {
        self.keyspace.write().await.flush();
        Ok(())
    }
}
