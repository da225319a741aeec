//! Redis backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tracing::info;

use crate::error::Result;
use crate::store::KvStore;

/// Reconnect attempts after the first failed connection.
const CONNECT_RETRIES: usize = 2;
/// Upper bound on the delay between reconnect attempts, in milliseconds.
const MAX_RETRY_DELAY_MS: u64 = 1_000;
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(2);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

fn connection_config() -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(CONNECT_RETRIES)
        .set_factor(2)
        .set_max_delay(MAX_RETRY_DELAY_MS)
        .set_connection_timeout(CONNECTION_TIMEOUT)
        .set_response_timeout(RESPONSE_TIMEOUT)
}

// == Redis Store ==
/// [`KvStore`] over one multiplexed Redis connection.
///
/// The [`ConnectionManager`] reconnects on its own after a dropped connection;
/// commands issued while the server is unreachable fail with
/// [`CacheError::StorageUnavailable`](crate::error::CacheError::StorageUnavailable).
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connects to the database at `url` (`redis://host:port/db`).
    ///
    /// Gives up after a few bounded retries when the server is unreachable.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new_with_config(client, connection_config()).await?;
        info!("Connected to Redis at {}", url);
        Ok(Self { connection })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut con = self.connection.clone();
        let value: Option<Vec<u8>> = con.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut con = self.connection.clone();
        let _: () = con.set(key, value).await?;
        Ok(())
    }

    async fn setex(&self, key: &str, ttl_secs: u64, value: &[u8]) -> Result<()> {
        let mut con = self.connection.clone();
        let _: () = con.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut con = self.connection.clone();
        let value: i64 = con.incr(key, 1).await?;
        Ok(value)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        let mut con = self.connection.clone();
        let len: usize = con.rpush(key, value).await?;
        Ok(len)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        let mut con = self.connection.clone();
        let items: Vec<Vec<u8>> = con.lrange(key, start, stop).await?;
        Ok(items)
    }

    async fn flushdb(&self) -> Result<()> {
        let mut con = self.connection.clone();
        let _: () = redis::cmd("FLUSHDB").query_async(&mut con).await?;
        Ok(())
    }
}
