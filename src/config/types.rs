//! Configuration types for the analysis pipeline.
//!
//! Defaults reproduce the plain analysis: severities are read from labels
//! only, labels preview ten entries, cycles are logged and both hierarchy
//! views are materialized.

use super::defaults::DEFAULT_LABEL_PREVIEW_LIMIT;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Unified Analysis Configuration
// ============================================================================

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How vulnerability severities are resolved
    pub severity: SeverityConfig,
    /// How the hierarchy views are materialized
    pub hierarchy: HierarchyConfig,
}

impl AnalysisConfig {
    /// Create a new `AnalysisConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AnalysisConfig` builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AnalysisConfig
// ============================================================================

/// Builder for constructing `AnalysisConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Band the first rating score when no rating carries a severity label.
    pub const fn derive_from_score(mut self, enabled: bool) -> Self {
        self.config.severity.derive_from_score = enabled;
        self
    }

    /// Rating methods to consider first, in order (e.g. `CVSSv31`).
    pub fn preferred_rating_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.severity.preferred_rating_methods =
            methods.into_iter().map(Into::into).collect();
        self
    }

    /// Number of vulnerabilities and licenses shown in a label preview.
    pub const fn label_preview_limit(mut self, limit: usize) -> Self {
        self.config.hierarchy.label_preview_limit = limit;
        self
    }

    /// Log a warning for every dependency cycle met during propagation.
    pub const fn warn_on_cycles(mut self, enabled: bool) -> Self {
        self.config.hierarchy.warn_on_cycles = enabled;
        self
    }

    /// Materialize the vulnerable-only view.
    pub const fn include_vulnerable_view(mut self, enabled: bool) -> Self {
        self.config.hierarchy.include_vulnerable_view = enabled;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> AnalysisConfig {
        self.config
    }
}

// ============================================================================
// Severity Configuration
// ============================================================================

/// Severity resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SeverityConfig {
    /// Fall back to CVSS banding of the first rating score when no label exists
    pub derive_from_score: bool,
    /// Rating methods searched first, in order; empty keeps document order
    pub preferred_rating_methods: Vec<String>,
}

// ============================================================================
// Hierarchy Configuration
// ============================================================================

/// Hierarchy materialization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Entries shown per label list before "more" is signalled
    pub label_preview_limit: usize,
    /// Log dependency cycles at warn level
    pub warn_on_cycles: bool,
    /// Materialize the vulnerable-only view
    pub include_vulnerable_view: bool,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            label_preview_limit: DEFAULT_LABEL_PREVIEW_LIMIT,
            warn_on_cycles: true,
            include_vulnerable_view: true,
        }
    }
}
