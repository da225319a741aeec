//! Page Fetcher Module
//!
//! Fetches web pages over HTTP, counting requests per URL and memoizing page
//! bodies with a [`TtlCache`].

use tracing::debug;

use crate::cache::decode_integer;
use crate::error::Result;
use crate::memo::{TtlCache, TtlConfig};
use crate::store::SharedStore;

/// Identity under which page bodies are memoized.
pub const GET_PAGE_IDENTITY: &str = "get_page";

/// Key of the request counter for `url`.
pub fn request_count_key(url: &str) -> String {
    format!("count:{url}")
}

// == Page Fetcher ==
/// HTTP page fetcher with per-URL request counting and cached bodies.
#[derive(Clone)]
pub struct PageFetcher {
    store: SharedStore,
    cache: TtlCache,
    http: reqwest::Client,
}

impl PageFetcher {
    /// Creates a fetcher that records into `store`.
    ///
    /// Fails if the configured expiration is shorter than one second.
    pub fn new(store: SharedStore, config: TtlConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            cache: TtlCache::new(store.clone(), config),
            store,
            http,
        })
    }

    /// Returns the body of `url`.
    ///
    /// Every call counts against the URL, including calls served from the
    /// cache. Bodies are kept for the configured expiration time.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let count = self.store.incr(&request_count_key(url)).await?;
        debug!(url, count, "Page requested");

        let http = &self.http;
        self.cache
            .cached_call(GET_PAGE_IDENTITY, url, None, move || async move {
                let response = http.get(url).send().await?.error_for_status()?;
                Ok(response.text().await?)
            })
            .await
    }

    /// How many times `url` has been requested in this session.
    pub async fn request_count(&self, url: &str) -> Result<u64> {
        match self.store.get(&request_count_key(url)).await? {
            Some(raw) => Ok(decode_integer(raw)?.max(0) as u64),
            None => Ok(0),
        }
    }
}
