//! Extraction of raw component, vulnerability and dependency records.
//!
//! The normalizer only locates the three record sequences of a CycloneDX-shaped
//! document. Interpreting individual records is left to the graph builder and
//! the vulnerability mapper, which apply their own per-field defaults.

use super::fields::{array_field, object_field, str_field, text_field};
use crate::model::{DocumentMetadata, MainComponent, ToolInfo};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// The three record sequences of an SBOM, borrowed from the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSbom<'a> {
    /// Component records (`components`, falling back to `metadata.components`)
    pub components: &'a [Value],
    /// Vulnerability records
    pub vulnerabilities: &'a [Value],
    /// Dependency records (`{ref, dependsOn}`)
    pub dependencies: &'a [Value],
}

impl<'a> RawSbom<'a> {
    /// Locate the record sequences of `document`.
    ///
    /// Absent or mistyped sequences are empty; a non-object document yields
    /// three empty sequences.
    #[must_use]
    pub fn from_document(document: &'a Value) -> Self {
        if !document.is_object() {
            return Self::default();
        }

        Self {
            components: normalize_components(document),
            vulnerabilities: array_field(document, "vulnerabilities"),
            dependencies: array_field(document, "dependencies"),
        }
    }

    /// True when all three sequences are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.vulnerabilities.is_empty() && self.dependencies.is_empty()
    }
}

fn normalize_components(document: &Value) -> &[Value] {
    if let Some(components) = document.get("components").and_then(Value::as_array) {
        return components;
    }
    document
        .get("metadata")
        .map_or(&[][..], |metadata| array_field(metadata, "components"))
}

/// Extract display metadata from `document`.
#[must_use]
pub fn extract_metadata(document: &Value) -> DocumentMetadata {
    let mut metadata = DocumentMetadata {
        spec_version: text_field(document, "specVersion"),
        serial_number: text_field(document, "serialNumber"),
        bom_version: text_field(document, "version"),
        ..DocumentMetadata::default()
    };

    let Some(meta) = document.get("metadata").filter(|m| m.is_object()) else {
        return metadata;
    };

    metadata.timestamp = str_field(meta, "timestamp").map(str::to_string);
    metadata.created = metadata
        .timestamp
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.with_timezone(&Utc));

    if let Some(component) = meta.get("component").filter(|c| c.is_object()) {
        metadata.main_component = Some(extract_main_component(component));
    }

    metadata.tools = extract_tools(meta);
    metadata
}

fn extract_main_component(component: &Value) -> MainComponent {
    let properties = array_field(component, "properties")
        .iter()
        .filter_map(|p| Some((str_field(p, "name")?.to_string(), text_field(p, "value")?)))
        .collect();

    MainComponent {
        component_type: text_field(component, "type"),
        group: text_field(component, "group"),
        name: text_field(component, "name"),
        version: text_field(component, "version"),
        description: text_field(component, "description"),
        purl: text_field(component, "purl"),
        properties,
    }
}

/// `metadata.tools` is an array up to CycloneDX 1.4 and an object with
/// `components`/`services` arrays from 1.5 on.
fn extract_tools(meta: &Value) -> Vec<ToolInfo> {
    let tool_values: Vec<&Value> = match meta.get("tools") {
        Some(Value::Array(tools)) => tools.iter().collect(),
        Some(tools @ Value::Object(_)) => array_field(tools, "components")
            .iter()
            .chain(array_field(tools, "services"))
            .collect(),
        _ => Vec::new(),
    };

    tool_values
        .into_iter()
        .filter(|t| t.is_object())
        .map(|tool| ToolInfo {
            vendor: text_field(tool, "vendor").or_else(|| {
                object_field(tool, "manufacturer")
                    .and_then(|m| m.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            }),
            name: text_field(tool, "name"),
            version: text_field(tool, "version"),
        })
        .collect()
}
