//! Request DTOs for the HTTP driver
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::cache::{Coercion, Value};
use crate::error::{CacheError, Result};

/// Request body for the STORE operation (PUT /store)
///
/// `value` may be a JSON string, integer, float, or an array of bytes.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRequest {
    /// The value to store
    pub value: serde_json::Value,
}

impl StoreRequest {
    /// Converts the JSON value into a cacheable scalar.
    pub fn into_value(self) -> Result<Value> {
        match self.value {
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Integer)
                .or_else(|| n.as_f64().map(Value::Float))
                .ok_or_else(|| CacheError::InvalidRequest(format!("Unsupported number: {n}"))),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|b| u8::try_from(b).ok())
                        .ok_or_else(|| {
                            CacheError::InvalidRequest(format!("Not a byte: {item}"))
                        })
                })
                .collect::<Result<Vec<u8>>>()
                .map(Value::Bytes),
            other => Err(CacheError::InvalidRequest(format!(
                "Value must be a string, number or byte array, got {other}"
            ))),
        }
    }
}

/// Query string for GET /get/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetQuery {
    /// Coercion applied to the stored bytes (default: text)
    #[serde(rename = "as", default)]
    pub coercion: Coercion,
}

/// Query string for GET /page
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    /// The URL to fetch
    pub url: String,
}
