//! TTL Result Cache Module
//!
//! Memoizes the results of expensive functions in the key-value store, keyed
//! by the function's identity and its serialized arguments. Entries expire in
//! the store itself, so an expired result is simply absent.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::{Config, DEFAULT_EXPIRATION_SECS};
use crate::error::{CacheError, Result};
use crate::store::SharedStore;

/// Prefix separating memoized results from every other key.
pub const CACHED_PREFIX: &str = "cached:";

// == TTL Config ==
/// Expiration settings for memoized results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlConfig {
    /// Lifetime of a result when the caller does not pass one
    pub expiration_time: Duration,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            expiration_time: Duration::from_secs(DEFAULT_EXPIRATION_SECS),
        }
    }
}

impl TtlConfig {
    /// Takes the expiration from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            expiration_time: config.expiration_time,
        }
    }

    /// Sets the default expiration.
    pub fn with_expiration(mut self, expiration_time: Duration) -> Self {
        self.expiration_time = expiration_time;
        self
    }

    /// Rejects a default expiration shorter than one second.
    pub fn validate(&self) -> Result<()> {
        whole_secs(self.expiration_time).map(|_| ())
    }
}

/// Truncates `ttl` to whole seconds, which must be at least one.
fn whole_secs(ttl: Duration) -> Result<u64> {
    match ttl.as_secs() {
        0 => Err(CacheError::InvalidRequest(format!(
            "TTL must be at least one second, got {ttl:?}"
        ))),
        secs => Ok(secs),
    }
}

/// Builds the store key for `identity` called with `args`.
pub fn cache_key<A: Serialize + ?Sized>(identity: &str, args: &A) -> Result<String> {
    let args = serde_json::to_string(args)?;
    Ok(format!("{CACHED_PREFIX}{identity}{args}"))
}

// == TTL Cache ==
/// Expiring memoization over a key-value store.
#[derive(Clone)]
pub struct TtlCache {
    store: SharedStore,
    config: TtlConfig,
}

impl TtlCache {
    /// Creates a cache writing into `store`. Construction does not flush.
    pub fn new(store: SharedStore, config: TtlConfig) -> Self {
        Self { store, config }
    }

    /// Returns the memoized result of `identity(args)` or computes it with `f`.
    ///
    /// On a miss `f` runs once and its result is stored for `ttl` (or the
    /// configured expiration when `None`). TTLs are truncated to whole
    /// seconds and must be at least one second. A failing `f` caches nothing.
    pub async fn cached_call<A, R, F, Fut>(
        &self,
        identity: &str,
        args: &A,
        ttl: Option<Duration>,
        f: F,
    ) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        let ttl_secs = self.ttl_secs(ttl)?;
        let key = cache_key(identity, args)?;

        if let Some(raw) = self.store.get(&key).await? {
            debug!(key = %key, "TTL cache hit");
            return Ok(serde_json::from_slice(&raw)?);
        }

        debug!(key = %key, ttl_secs, "TTL cache miss");
        let result = f().await?;
        let encoded = serde_json::to_vec(&result)?;
        self.store.setex(&key, ttl_secs, &encoded).await?;

        Ok(result)
    }

    fn ttl_secs(&self, ttl: Option<Duration>) -> Result<u64> {
        whole_secs(ttl.unwrap_or(self.config.expiration_time))
    }
}
