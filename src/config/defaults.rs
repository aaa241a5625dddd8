//! Default values and presets for analysis configuration.

use super::types::{AnalysisConfig, HierarchyConfig, SeverityConfig};

// ============================================================================
// Default Values
// ============================================================================

/// Entries shown per label list before "more" is signalled.
pub const DEFAULT_LABEL_PREVIEW_LIMIT: usize = 10;

/// Rating methods recognized in `severity.preferred_rating_methods`.
pub const KNOWN_RATING_METHODS: &[&str] =
    &["CVSSv4", "CVSSv31", "CVSSv3", "CVSSv2", "OWASP", "SSVC", "other"];

/// Preference order used by the `cvss` preset, most recent CVSS first.
pub const CVSS_RATING_PREFERENCE: &[&str] = &["CVSSv4", "CVSSv31", "CVSSv3", "CVSSv2", "OWASP"];

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Severity from labels only, both views, cycle warnings
    Default,
    /// Prefer CVSS ratings and band scores when a label is missing
    Cvss,
    /// Full view only, short previews, no cycle warnings
    Minimal,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Cvss => "cvss",
            Self::Minimal => "minimal",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "cvss" | "score" => Some(Self::Cvss),
            "minimal" | "quiet" => Some(Self::Minimal),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Severity labels as declared, full and vulnerable-only views",
            Self::Cvss => "Prefer CVSS ratings and derive missing severities from scores",
            Self::Minimal => "Full view only with short label previews and no cycle warnings",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Cvss, Self::Minimal]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AnalysisConfig {
    /// Create an `AnalysisConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Cvss => Self::cvss_preset(),
            ConfigPreset::Minimal => Self::minimal_preset(),
        }
    }

    /// CVSS-oriented preset.
    ///
    /// - Ratings searched in `CVSSv4 > CVSSv31 > CVSSv3 > CVSSv2 > OWASP` order
    /// - Scores banded into severities when no label is present
    #[must_use]
    pub fn cvss_preset() -> Self {
        Self {
            severity: SeverityConfig {
                derive_from_score: true,
                preferred_rating_methods: CVSS_RATING_PREFERENCE
                    .iter()
                    .map(|m| (*m).to_string())
                    .collect(),
            },
            hierarchy: HierarchyConfig::default(),
        }
    }

    /// Minimal preset for batch runs.
    #[must_use]
    pub fn minimal_preset() -> Self {
        Self {
            severity: SeverityConfig::default(),
            hierarchy: HierarchyConfig {
                label_preview_limit: 5,
                warn_on_cycles: false,
                include_vulnerable_view: false,
            },
        }
    }
}
