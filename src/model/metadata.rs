//! Display metadata of an SBOM document.
//!
//! Nothing in here takes part in the graph analysis; it is carried through so
//! the rendering side can show what the document describes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document-level metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// `specVersion`
    pub spec_version: Option<String>,
    /// `serialNumber`
    pub serial_number: Option<String>,
    /// BOM revision (`version`)
    pub bom_version: Option<String>,
    /// Raw `metadata.timestamp`
    pub timestamp: Option<String>,
    /// `metadata.timestamp` parsed as RFC 3339
    pub created: Option<DateTime<Utc>>,
    /// `metadata.component`
    pub main_component: Option<MainComponent>,
    /// `metadata.tools`
    pub tools: Vec<ToolInfo>,
}

impl DocumentMetadata {
    /// True when no metadata field was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spec_version.is_none()
            && self.serial_number.is_none()
            && self.bom_version.is_none()
            && self.timestamp.is_none()
            && self.main_component.is_none()
            && self.tools.is_empty()
    }
}

/// The component the SBOM describes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainComponent {
    #[serde(rename = "type")]
    pub component_type: Option<String>,
    pub group: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub purl: Option<String>,
    /// `properties` as `(name, value)` pairs, in document order
    pub properties: Vec<(String, String)>,
}

/// Tool that produced the SBOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub vendor: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
}
