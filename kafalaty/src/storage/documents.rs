//! Conversion between typed records and stored documents.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::traits::{Document, StoredDocument};
use crate::domain::errors::StoreError;

/// Encode a record into a document field map
pub fn encode<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(record).map_err(StoreError::unknown)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::unknown(format!(
            "record did not encode to an object: {}",
            other
        ))),
    }
}

/// Decode a stored document into a record
pub fn decode<T: DeserializeOwned>(document: &StoredDocument) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(document.fields.clone())).map_err(|e| {
        StoreError::unknown(format!("malformed document {}: {}", document.id, e))
    })
}
