//! Serialized form of cell values
//!
//! Cells are stored as UTF-8 JSON text. Encoding can fail (a value whose
//! `Serialize` impl refuses, a map keyed by something that is not a string);
//! decoding never surfaces an error to store callers, it yields `None` and the
//! caller falls back to a default.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Convert a typed value into the structural form the store keeps in memory
pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Render a structural value as stored text
pub fn to_text(value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
}

/// Encode a typed value straight to stored text
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    to_text(&to_value(value)?)
}

/// Parse stored text; the error string is only used for logging
pub fn parse(text: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

/// Interpret a structural value as `T`
pub fn from_value<T: DeserializeOwned>(value: &Value) -> std::result::Result<T, String> {
    T::deserialize(value).map_err(|e| e.to_string())
}

/// Decode stored text as `T`, `None` on any failure
pub fn decode<T: DeserializeOwned>(text: &str) -> Option<T> {
    parse(text).ok().and_then(|v| from_value(&v).ok())
}
