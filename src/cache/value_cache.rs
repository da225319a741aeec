//! Value Cache Module
//!
//! Stores scalar values under freshly generated keys and reads them back with
//! an explicit coercion.

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{decode_float, decode_integer, decode_text, Coercion, Value};
use crate::error::Result;
use crate::instrument::{self, CallLog, Instrumentation};
use crate::store::SharedStore;

/// Identity under which [`Cache::store`] is counted and recorded.
pub const STORE_IDENTITY: &str = "Cache.store";

// == Cache ==
/// Typed value cache over a key-value store.
///
/// # Fresh session
///
/// [`Cache::new`] **erases the whole backing database** (`FLUSHDB`). Every key
/// written by earlier sessions, or by any other client sharing that Redis
/// database, is gone once a `Cache` is constructed. Point it at a database
/// reserved for this cache.
#[derive(Clone)]
pub struct Cache {
    store: SharedStore,
    instrumentation: Instrumentation,
}

impl Cache {
    // == Constructor ==
    /// Flushes the store and returns a cache with the default hook chain
    /// (call counting, then call history) around [`Cache::store`].
    pub async fn new(store: SharedStore) -> Result<Self> {
        let instrumentation = Instrumentation::new(store.clone());
        Self::with_instrumentation(store, instrumentation).await
    }

    /// Flushes the store and returns a cache using the given hook chain.
    pub async fn with_instrumentation(
        store: SharedStore,
        instrumentation: Instrumentation,
    ) -> Result<Self> {
        store.flushdb().await?;
        info!("Flushed {} store for a new cache session", store.name());
        Ok(Self {
            store,
            instrumentation,
        })
    }

    // == Store ==
    /// Stores `value` under a new random key and returns the key.
    pub async fn store(&self, value: impl Into<Value>) -> Result<String> {
        let value = value.into();
        let args = [value.clone()];
        let store = &self.store;

        self.instrumentation
            .call(STORE_IDENTITY, &args, move || async move {
                let key = Uuid::new_v4().to_string();
                store.set(&key, &value.to_bytes()).await?;
                debug!(key = %key, "Stored value");
                Ok(key)
            })
            .await
    }

    // == Retrieve ==
    /// Reads the value at `key` and coerces it.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub async fn retrieve(&self, key: &str, coercion: Coercion) -> Result<Option<Value>> {
        self.retrieve_with(key, |raw| coercion.apply(raw)).await
    }

    /// Reads the value at `key` as text.
    pub async fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.retrieve_with(key, decode_text).await
    }

    /// Reads the value at `key` as an integer.
    pub async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.retrieve_with(key, decode_integer).await
    }

    /// Reads the value at `key` as a float.
    pub async fn get_float(&self, key: &str) -> Result<Option<f64>> {
        self.retrieve_with(key, decode_float).await
    }

    /// Reads the raw bytes at `key`.
    pub async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.store.get(key).await
    }

    async fn retrieve_with<T>(
        &self,
        key: &str,
        decode: impl FnOnce(Vec<u8>) -> Result<T>,
    ) -> Result<Option<T>> {
        self.store.get(key).await?.map(decode).transpose()
    }

    // == Replay ==
    /// Rebuilds the call log recorded for `identity` on this cache's store.
    pub async fn replay(&self, identity: &str) -> Result<CallLog> {
        instrument::replay(self.store.as_ref(), identity).await
    }
}
