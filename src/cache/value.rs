//! Cached Value Module
//!
//! The scalar values the cache accepts, their wire encoding, the coercions
//! applied on retrieval, and the textual rendering used for call history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Value ==
/// A scalar value held by the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// UTF-8 text
    Text(String),
    /// Arbitrary bytes
    Bytes(Vec<u8>),
    /// Signed integer
    Integer(i64),
    /// Floating point number
    Float(f64),
}

impl Value {
    /// Encodes the value the way the backend stores it.
    ///
    /// Numbers are written as decimal text; floats use the shortest text that
    /// parses back to the same `f64`.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::Text(s) => s.as_bytes().to_vec(),
            Value::Bytes(b) => b.clone(),
            Value::Integer(n) => n.to_string().into_bytes(),
            Value::Float(f) => format!("{f:?}").into_bytes(),
        }
    }

    /// Renders the value as a literal: quoted text, `b'..'` bytes, bare numbers.
    pub fn repr(&self) -> String {
        match self {
            Value::Text(s) => quote_text(s),
            Value::Bytes(b) => quote_bytes(b),
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => format!("{f:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            other => f.write_str(&other.repr()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Value::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

// == Coercion ==
/// How raw stored bytes are turned back into a [`Value`] on retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coercion {
    /// Decode as UTF-8 text
    #[default]
    Text,
    /// Parse as a decimal integer
    Integer,
    /// Parse as a floating point number
    Float,
    /// Return the bytes untouched
    Raw,
}

impl Coercion {
    /// Applies the coercion to raw stored bytes.
    pub fn apply(self, raw: Vec<u8>) -> Result<Value> {
        match self {
            Coercion::Text => decode_text(raw).map(Value::Text),
            Coercion::Integer => decode_integer(raw).map(Value::Integer),
            Coercion::Float => decode_float(raw).map(Value::Float),
            Coercion::Raw => Ok(Value::Bytes(raw)),
        }
    }
}

/// Decodes stored bytes as UTF-8 text.
pub fn decode_text(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| CacheError::Coercion(format!("not valid UTF-8: {e}")))
}

/// Parses stored bytes as a decimal integer.
pub fn decode_integer(raw: Vec<u8>) -> Result<i64> {
    let text = decode_text(raw)?;
    text.parse()
        .map_err(|_| CacheError::Coercion(format!("not an integer: {text:?}")))
}

/// Parses stored bytes as a floating point number.
pub fn decode_float(raw: Vec<u8>) -> Result<f64> {
    let text = decode_text(raw)?;
    text.parse()
        .map_err(|_| CacheError::Coercion(format!("not a float: {text:?}")))
}

// == Argument Rendering ==
/// Renders positional arguments as a tuple literal: `()`, `('a',)`, `('a', 2)`.
pub fn render_args(args: &[Value]) -> String {
    let items: Vec<String> = args.iter().map(Value::repr).collect();
    match items.as_slice() {
        [single] => format!("({single},)"),
        _ => format!("({})", items.join(", ")),
    }
}

fn quote_text(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{code:02x}"));
                } else {
                    out.push_str(&format!("\\u{code:04x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn quote_bytes(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            0x20..=0x7e => out.push(b as char),
            b => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push(quote as char);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes_encodings() {
        assert_eq!(Value::from("hi").to_bytes(), b"hi");
        assert_eq!(Value::from(vec![0u8, 255]).to_bytes(), vec![0u8, 255]);
        assert_eq!(Value::from(-42).to_bytes(), b"-42");
        assert_eq!(Value::from(3.0).to_bytes(), b"3.0");
        assert_eq!(Value::from(0.1).to_bytes(), b"0.1");
    }

    #[test]
    fn test_repr() {
        assert_eq!(Value::from("a").repr(), "'a'");
        assert_eq!(Value::from("it's").repr(), "\"it's\"");
        assert_eq!(Value::from("both ' and \"").repr(), "'both \\' and \"'");
        assert_eq!(Value::from("tab\there").repr(), "'tab\\there'");
        assert_eq!(Value::from(b"ab\x00".as_slice()).repr(), "b'ab\\x00'");
        assert_eq!(Value::from(7).repr(), "7");
        assert_eq!(Value::from(2.5).repr(), "2.5");
    }

    #[test]
    fn test_display_text_is_unquoted() {
        assert_eq!(Value::from("key").to_string(), "key");
        assert_eq!(Value::from(b"k".as_slice()).to_string(), "b'k'");
    }

    #[test]
    fn test_render_args() {
        assert_eq!(render_args(&[]), "()");
        assert_eq!(render_args(&[Value::from("a")]), "('a',)");
        assert_eq!(render_args(&[Value::from("a"), Value::from(2)]), "('a', 2)");
    }

    #[test]
    fn test_coercions() {
        assert_eq!(
            Coercion::Text.apply(b"hello".to_vec()).unwrap(),
            Value::Text("hello".to_string())
        );
        assert_eq!(
            Coercion::Integer.apply(b"123".to_vec()).unwrap(),
            Value::Integer(123)
        );
        assert_eq!(
            Coercion::Float.apply(b"1.5".to_vec()).unwrap(),
            Value::Float(1.5)
        );
        assert_eq!(
            Coercion::Raw.apply(vec![1, 2]).unwrap(),
            Value::Bytes(vec![1, 2])
        );
    }

    #[test]
    fn test_coercion_failures() {
        assert!(matches!(
            Coercion::Integer.apply(b"abc".to_vec()),
            Err(CacheError::Coercion(_))
        ));
        assert!(matches!(
            Coercion::Float.apply(b"1.5x".to_vec()),
            Err(CacheError::Coercion(_))
        ));
        assert!(matches!(
            Coercion::Text.apply(vec![0xff, 0xfe]),
            Err(CacheError::Coercion(_))
        ));
    }

    #[test]
    fn test_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&Value::from("x")).unwrap(), "\"x\"");
        assert_eq!(serde_json::to_string(&Value::from(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Value::from(vec![1u8])).unwrap(), "[1]");
    }
}
