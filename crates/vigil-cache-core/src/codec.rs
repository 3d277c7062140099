//! Value codec: application values to and from the stored text payload
//!
//! The store only holds text. Scalars pass through as their canonical
//! decimal or verbatim text; structured values round-trip through canonical
//! JSON. Each variant has exactly one encode path and `decode` classifies
//! stored text back into a variant.

use serde::Serialize;

use crate::{CacheError, Result};

/// A cache value, resolved to its variant before transmission
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// Verbatim text payload
    Text(String),
    /// Integer scalar, stored as its decimal text
    Integer(i64),
    /// Float scalar, stored as its decimal text
    Float(f64),
    /// Structured value, stored as canonical JSON text
    Json(serde_json::Value),
}

impl CacheValue {
    /// Encode the value into the text payload sent to the store
    pub fn encode(&self) -> Result<String> {
        match self {
            CacheValue::Text(s) => Ok(s.clone()),
            CacheValue::Integer(i) => Ok(i.to_string()),
            CacheValue::Float(f) => Ok(f.to_string()),
            CacheValue::Json(v) => serde_json::to_string(v)
                .map_err(|e| CacheError::Serialization(e.to_string())),
        }
    }

    /// Classify a stored text payload back into a value variant.
    ///
    /// JSON objects/arrays are recognized first, then integer and float
    /// scalars; anything else is plain text.
    pub fn decode(text: &str) -> CacheValue {
        if (text.starts_with('{') && text.ends_with('}'))
            || (text.starts_with('[') && text.ends_with(']'))
        {
            if let Ok(v) = serde_json::from_str(text) {
                return CacheValue::Json(v);
            }
        }
        if let Ok(i) = text.parse::<i64>() {
            return CacheValue::Integer(i);
        }
        if let Ok(f) = text.parse::<f64>() {
            return CacheValue::Float(f);
        }
        CacheValue::Text(text.to_string())
    }

    /// Build a structured value from any serializable type
    pub fn structured<T: Serialize>(value: &T) -> Result<CacheValue> {
        serde_json::to_value(value)
            .map(CacheValue::Json)
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Borrow the text payload if this is a `Text` variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CacheValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CacheValue {
    fn from(s: &str) -> Self {
        CacheValue::Text(s.to_string())
    }
}

impl From<String> for CacheValue {
    fn from(s: String) -> Self {
        CacheValue::Text(s)
    }
}

impl From<i64> for CacheValue {
    fn from(i: i64) -> Self {
        CacheValue::Integer(i)
    }
}

impl From<f64> for CacheValue {
    fn from(f: f64) -> Self {
        CacheValue::Float(f)
    }
}

impl From<serde_json::Value> for CacheValue {
    fn from(v: serde_json::Value) -> Self {
        CacheValue::Json(v)
    }
}
