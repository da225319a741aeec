//! Configuration Module
//!
//! Handles loading backend, cache and server settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default expiration for memoized results, in seconds.
pub const DEFAULT_EXPIRATION_SECS: u64 = 10;

/// Which key-value backend the driver connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// A Redis server reached over the network
    Redis,
    /// The in-process store
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Key-value backend to use
    pub backend: StoreBackend,
    /// Redis host
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Redis logical database index
    pub redis_db: i64,
    /// Default lifetime of memoized results
    pub expiration_time: Duration,
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweep interval in seconds (memory backend only)
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STORE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_HOST` - Redis host (default: 127.0.0.1)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_DB` - Redis database index (default: 0)
    /// - `EXPIRATION_TIME` - Memoized result lifetime in seconds (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: parse_var("STORE_BACKEND").unwrap_or(defaults.backend),
            redis_host: env::var("REDIS_HOST").unwrap_or(defaults.redis_host),
            redis_port: parse_var("REDIS_PORT").unwrap_or(defaults.redis_port),
            redis_db: parse_var("REDIS_DB").unwrap_or(defaults.redis_db),
            expiration_time: parse_var("EXPIRATION_TIME")
                .map(Duration::from_secs)
                .unwrap_or(defaults.expiration_time),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Connection URL for the configured Redis database.
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            redis_host: "127.0.0.1".to_string(),
            redis_port: 6379,
            redis_db: 0,
            expiration_time: Duration::from_secs(DEFAULT_EXPIRATION_SECS),
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
