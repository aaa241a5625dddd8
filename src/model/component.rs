//! Component nodes of the dependency graph.

use super::{max_severity, Severity, VulnerabilityList, VulnerabilityRecord};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version placeholder used when a component declares none.
pub const NO_VERSION: &str = "-";

/// Component type used when a component declares none.
pub const DEFAULT_COMPONENT_TYPE: &str = "library";

/// Name used when a component declares none.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Stable identity of a component inside one graph.
///
/// Chosen as the first present of `bom-ref`, `bomRef`, `purl`, `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Wrap a raw identifier. Returns `None` for empty strings.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One SBOM component with its edges and vulnerability annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Graph identity
    pub id: ComponentId,
    /// Component name
    pub name: String,
    /// Version string, `"-"` when absent
    pub version: String,
    /// Component type, `"library"` when absent
    #[serde(rename = "type")]
    pub component_type: String,
    /// Package URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    /// Dependency scope (required, optional, excluded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Supplier name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// License identifiers, deduplicated
    pub licenses: IndexSet<String>,
    /// Components this one depends on
    pub depends_on: IndexSet<ComponentId>,
    /// Components depending on this one
    pub dependency_of: IndexSet<ComponentId>,
    /// Vulnerabilities affecting this component directly
    pub direct_vulnerabilities: VulnerabilityList,
    /// Vulnerabilities inherited from any descendant
    pub transitive_vulnerabilities: VulnerabilityList,
    /// Worst direct severity, `clean` when there is none
    pub max_severity: Severity,
    /// Whether any descendant carries a vulnerability
    pub has_transitive_vulnerabilities: bool,
}

impl ComponentNode {
    /// Create a node with default name, version and type and no annotations.
    #[must_use]
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            name: UNKNOWN_NAME.to_string(),
            version: NO_VERSION.to_string(),
            component_type: DEFAULT_COMPONENT_TYPE.to_string(),
            purl: None,
            scope: None,
            supplier: None,
            licenses: IndexSet::new(),
            depends_on: IndexSet::new(),
            dependency_of: IndexSet::new(),
            direct_vulnerabilities: VulnerabilityList::new(),
            transitive_vulnerabilities: VulnerabilityList::new(),
            max_severity: Severity::Clean,
            has_transitive_vulnerabilities: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Version, or `None` for the `"-"` placeholder.
    #[must_use]
    pub fn declared_version(&self) -> Option<&str> {
        (self.version != NO_VERSION).then_some(self.version.as_str())
    }

    /// Attach a direct vulnerability. Returns `false` if the id was already attached.
    pub fn add_direct_vulnerability(&mut self, record: VulnerabilityRecord) -> bool {
        self.direct_vulnerabilities.insert(record)
    }

    /// Recompute `max_severity` from the direct vulnerabilities.
    pub fn refresh_max_severity(&mut self) {
        self.max_severity = max_severity(self.direct_vulnerabilities.iter().map(|v| &v.severity));
    }

    #[must_use]
    pub fn is_directly_vulnerable(&self) -> bool {
        !self.direct_vulnerabilities.is_empty()
    }

    /// Directly or transitively vulnerable.
    #[must_use]
    pub fn is_affected(&self) -> bool {
        !self.direct_vulnerabilities.is_empty() || !self.transitive_vulnerabilities.is_empty()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.dependency_of.is_empty()
    }

    /// Name with version, e.g. `lodash@4.17.21`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.declared_version()
            .map_or_else(|| self.name.clone(), |v| format!("{}@{}", self.name, v))
    }
}
