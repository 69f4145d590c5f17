//! JSON document representation used by the record store
//!
//! Records cross the store boundary as loose JSON objects so one store
//! adapter serves all four tables. Typed record structs convert at the edge
//! through [`to_document`] and [`from_document`].

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A stored row: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, Value>;

/// Serialize a typed record into a store document.
///
/// Returns [`Error::Serialization`] if the value does not serialize to a JSON
/// object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::Serialization {
            message: format!("expected a JSON object, got {}", json_type_name(&other)),
        }),
    }
}

/// Deserialize a store document into a typed record.
pub fn from_document<T: DeserializeOwned>(doc: &Document) -> Result<T> {
    let value = Value::Object(doc.clone());
    Ok(serde_json::from_value(value)?)
}

/// Read a string field from a document, if present and a string.
pub fn field_str<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
