//! Tolerant reading of CycloneDX-shaped SBOM documents.
//!
//! Documents are consumed as [`serde_json::Value`] rather than typed structs so
//! that a mistyped field degrades to "absent" instead of rejecting the whole
//! document.

pub mod fields;
mod normalizer;

pub use normalizer::{extract_metadata, RawSbom};

use crate::error::{ParseErrorKind, Result, SbomAnalysisError};
use serde_json::Value;

/// Parse JSON text into a document value.
///
/// Only JSON syntax errors are reported; the shape of the document is not checked.
pub fn parse_document_str(content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| {
        SbomAnalysisError::parse("reading SBOM JSON", ParseErrorKind::InvalidJson(e.to_string()))
    })
}

/// Ensure `document` is a JSON object.
pub fn require_object(document: &Value) -> Result<&Value> {
    if document.is_object() {
        Ok(document)
    } else {
        Err(SbomAnalysisError::not_an_object(json_type_name(document)))
    }
}

/// JSON type name of `value`, for messages.
#[must_use]
pub const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
