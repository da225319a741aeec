//! cachetrace - An instrumented key-value caching layer
//!
//! Stores values in a key-value backend, counts and records every call of
//! the instrumented operations, replays the recorded history, and memoizes
//! expensive calls with an expiring result cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod instrument;
pub mod memo;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, Coercion, Value};
pub use config::Config;
pub use error::{CacheError, Result};
pub use instrument::{replay, CallLog, Instrumentation};
pub use memo::{PageFetcher, TtlCache, TtlConfig};
pub use store::{KvStore, MemoryStore, RedisStore, SharedStore};
pub use tasks::spawn_cleanup_task;
