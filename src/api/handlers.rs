//! API Handlers
//!
//! HTTP request handlers exposing the caching layer.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cache::Cache;
use crate::error::Result;
use crate::memo::{PageFetcher, TtlConfig};
use crate::models::{
    GetQuery, GetResponse, HealthResponse, PageQuery, PageResponse, ReplayResponse, StoreRequest,
    StoreResponse,
};
use crate::store::SharedStore;

/// Application state shared across all handlers.
///
/// Every component is built over the same store handle.
#[derive(Clone)]
pub struct AppState {
    /// Backing store
    pub store: SharedStore,
    /// Instrumented value cache
    pub cache: Arc<Cache>,
    /// Memoizing page fetcher
    pub pages: Arc<PageFetcher>,
}

impl AppState {
    /// Creates the state over `store`.
    ///
    /// Constructing the value cache flushes the store.
    pub async fn new(store: SharedStore, ttl: TtlConfig) -> Result<Self> {
        let cache = Cache::new(store.clone()).await?;
        let pages = PageFetcher::new(store.clone(), ttl)?;
        Ok(Self {
            store,
            cache: Arc::new(cache),
            pages: Arc::new(pages),
        })
    }
}

/// Handler for PUT /store
///
/// Stores a scalar value under a generated key.
pub async fn store_handler(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    let value = req.into_value()?;
    let key = state.cache.store(value).await?;

    Ok(Json(StoreResponse::new(key)))
}

/// Handler for GET /get/:key
///
/// Retrieves a value, coerced as requested by `?as=`.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<GetQuery>,
) -> Result<Json<GetResponse>> {
    let value = state.cache.retrieve(&key, query.coercion).await?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for GET /replay/:identity
///
/// Returns the recorded call log of an instrumented operation.
pub async fn replay_handler(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<ReplayResponse>> {
    let log = state.cache.replay(&identity).await?;

    Ok(Json(ReplayResponse::from(log)))
}

/// Handler for GET /page?url=
///
/// Fetches a page through the TTL cache.
pub async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>> {
    let content = state.pages.get_page(&query.url).await?;
    let requests = state.pages.request_count(&query.url).await?;

    Ok(Json(PageResponse {
        url: query.url,
        content,
        requests,
    }))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.store.name()))
}
