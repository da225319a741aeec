//! Cache Module
//!
//! Typed value storage over a [`KvStore`](crate::store::KvStore), with every
//! write instrumented for call counting and call history.

mod value;
mod value_cache;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use value::{decode_float, decode_integer, decode_text, render_args, Coercion, Value};
pub use value_cache::{Cache, STORE_IDENTITY};
