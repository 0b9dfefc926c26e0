//! Conversions between Value and serde types.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{BackendError, Value};

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, BackendError> {
    // Convert Value to serde_json::Value first, then deserialize
    let json = value_to_json(value)?;
    serde_json::from_value(json).map_err(|e| BackendError::type_mismatch(e.to_string()))
}

/// Convert a Rust type to a Value via serde.
///
/// Integers above `i64::MAX` are rejected rather than stored as lossy floats.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, BackendError> {
    let json =
        serde_json::to_value(data).map_err(|e| BackendError::serialization(e.to_string()))?;
    check_integer_range(&json)?;
    Ok(json_to_value(json))
}

fn check_integer_range(json: &serde_json::Value) -> Result<(), BackendError> {
    match json {
        serde_json::Value::Number(n) if n.is_u64() && n.as_i64().is_none() => Err(
            BackendError::serialization(format!("integer {} does not fit in an i64", n)),
        ),
        serde_json::Value::Array(arr) => arr.iter().try_for_each(check_integer_range),
        serde_json::Value::Object(map) => map.values().try_for_each(check_integer_range),
        _ => Ok(()),
    }
}

/// Convert our Value to serde_json::Value.
///
/// Fails on non-finite floats: JSON has no representation for them, and
/// silently writing `null` would make the persisted document differ from the
/// one that was saved.
pub fn value_to_json(value: Value) -> Result<serde_json::Value, BackendError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                BackendError::serialization(format!("non-finite float {} has no JSON form", f))
            })?,
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(
            arr.into_iter()
                .map(value_to_json)
                .collect::<Result<_, BackendError>>()?,
        ),
        Value::Map(map) => serde_json::Value::Object(
            map.into_iter()
                .map(|(k, v)| Ok::<_, BackendError>((k, value_to_json(v)?)))
                .collect::<Result<_, BackendError>>()?,
        ),
    })
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for very large numbers
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}
