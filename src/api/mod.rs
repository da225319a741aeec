//! API Module
//!
//! HTTP handlers and routing for the driver's REST API.
//!
//! # Endpoints
//! - `PUT /store` - Store a value under a generated key
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /replay/:identity` - Recorded call log of an operation
//! - `GET /page?url=` - Fetch a page through the TTL cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
