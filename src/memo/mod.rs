//! Memoization Module
//!
//! Expiring result caching for expensive calls, independent of the value
//! cache's key space.

mod page;
mod ttl_cache;

pub use page::{request_count_key, PageFetcher, GET_PAGE_IDENTITY};
pub use ttl_cache::{cache_key, TtlCache, TtlConfig, CACHED_PREFIX};
