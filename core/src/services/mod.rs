//! Per-resource service functions over `ApiClient`.
//!
//! # Design
//! Each service validates its draft, maps it to the backend shape, sends it,
//! and maps the reply back to the client models in `types.rs`. Failures keep
//! their `ErrorKind` and gain a short description of the operation, for
//! example "Failed to fetch quiz with ID 3".

pub mod attempts;
pub mod categories;
pub mod quizzes;
pub mod reviews;

pub use attempts::AttemptService;
pub use categories::CategoryService;
pub use quizzes::QuizService;
pub use reviews::ReviewService;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::Payload;
use crate::error::ApiError;
use crate::mapping::{map_to_backend, map_to_frontend, EntityKind};

/// Serialize `draft` and rename its fields for the backend.
pub(crate) fn encode<S: Serialize>(draft: &S, kind: EntityKind) -> Result<Value, ApiError> {
    let value = serde_json::to_value(draft).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(map_to_backend(&value, kind))
}

/// `encode` with extra top-level fields merged in.
pub(crate) fn encode_with<S: Serialize>(
    draft: &S,
    kind: EntityKind,
    extra: &[(&str, Value)],
) -> Result<Payload, ApiError> {
    let mut value = encode(draft, kind)?;
    if let Value::Object(record) = &mut value {
        for (key, field) in extra {
            record.insert((*key).to_string(), field.clone());
        }
    }
    Ok(Payload::Json(value))
}

/// Rename backend fields of `value`, and of the records nested under
/// `nested`, then decode.
pub(crate) fn decode<U: DeserializeOwned>(
    value: &Value,
    kind: EntityKind,
    nested: &[(&str, EntityKind)],
) -> Result<U, ApiError> {
    let mut mapped = map_to_frontend(value, kind);
    map_nested(&mut mapped, nested);
    serde_json::from_value(mapped).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn map_nested(record: &mut Value, nested: &[(&str, EntityKind)]) {
    let Value::Object(record) = record else {
        return;
    };
    for (field, nested_kind) in nested {
        if let Some(inner) = record.get_mut(*field) {
            *inner = match &*inner {
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| map_to_frontend(item, *nested_kind))
                        .collect(),
                ),
                other => map_to_frontend(other, *nested_kind),
            };
        }
    }
}

fn missing_body(what: impl fmt::Display) -> ApiError {
    ApiError::Deserialization(format!("expected a {what} in the response body"))
}

/// Decode a required single record.
pub(crate) fn decode_one<U: DeserializeOwned>(
    value: Option<Value>,
    kind: EntityKind,
    nested: &[(&str, EntityKind)],
) -> Result<U, ApiError> {
    let value = value.ok_or_else(|| missing_body(kind))?;
    decode(&value, kind, nested)
}

/// Decode a required record whose own fields already match the client
/// models. Only the records under `nested` are renamed.
pub(crate) fn decode_record<U: DeserializeOwned>(
    value: Option<Value>,
    what: &str,
    nested: &[(&str, EntityKind)],
) -> Result<U, ApiError> {
    let mut value = value.ok_or_else(|| missing_body(what))?;
    map_nested(&mut value, nested);
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Decode a list. An empty body is an empty list; any other non-array body
/// is an error.
pub(crate) fn decode_list<U: DeserializeOwned>(
    value: Option<Value>,
    kind: EntityKind,
    nested: &[(&str, EntityKind)],
) -> Result<Vec<U>, ApiError> {
    match value {
        Some(Value::Array(items)) => items.iter().map(|item| decode(item, kind, nested)).collect(),
        None => Ok(Vec::new()),
        Some(other) => Err(ApiError::Deserialization(format!(
            "expected a list of {kind} records, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
