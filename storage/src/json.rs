//! `Message.metadata`, `Block.metadata`, and the JSON-valued plan/todo
//! fields are normalized to strings on write and parsed back on read (§3.2).
//! These helpers are the single place that normalization happens so every
//! table handles `NULL` vs. `"null"` the same way.

use octave_error::Error;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Serializes `value` to a JSON string, or `None` for SQL `NULL`.
pub fn to_json_opt(value: &Option<Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

/// Parses a nullable JSON column back into `Option<Value>`.
pub fn from_json_opt(text: Option<String>) -> Result<Option<Value>, Error> {
    text.map(|t| {
        serde_json::from_str(&t).map_err(|e| Error::DbError {
            operation: "decode json column".to_string(),
            message: e.to_string(),
        })
    })
    .transpose()
}

/// Serializes a required, non-nullable JSON-typed field (e.g. `Todo.block_ids`).
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(|e| Error::DbError {
        operation: "encode json column".to_string(),
        message: e.to_string(),
    })
}

/// Parses a required, non-nullable JSON-typed field back into `T`.
pub fn from_json_str<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    serde_json::from_str(text).map_err(|e| Error::DbError {
        operation: "decode json column".to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
#[path = "json.test.rs"]
mod tests;
