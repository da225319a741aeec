//! Request and Response models for the HTTP driver
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{GetQuery, PageQuery, StoreRequest};
pub use responses::{GetResponse, HealthResponse, PageResponse, ReplayResponse, StoreResponse};
