//! Defensive accessors over loosely-typed JSON.
//!
//! SBOMs in the wild omit fields and use the wrong types for others. None of
//! these helpers fail: a missing or mistyped field reads as absent.

use serde_json::{Map, Value};

/// Non-empty string field.
pub fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// String field, or a number/bool rendered as text.
pub fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Array field, empty when absent or not an array.
pub fn array_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

/// Object field.
pub fn object_field<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

/// Numeric field. Numeric strings such as `"7.5"` are accepted.
pub fn number_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Nested string field, e.g. `source.name`.
pub fn nested_str_field<'a>(value: &'a Value, outer: &str, inner: &str) -> Option<&'a str> {
    value.get(outer).and_then(|v| str_field(v, inner))
}
