//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_handler, health_handler, page_handler, replay_handler, store_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /store` - Store a value under a generated key
/// - `GET /get/:key` - Retrieve a value, `?as=text|integer|float|raw`
/// - `GET /replay/:identity` - Recorded call log of an operation
/// - `GET /page?url=` - Fetch a page through the TTL cache
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/store", put(store_handler))
        .route("/get/:key", get(get_handler))
        .route("/replay/:identity", get(replay_handler))
        .route("/page", get(page_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
