//! Configuration validation.

use super::defaults::KNOWN_RATING_METHODS;
use super::types::{AnalysisConfig, HierarchyConfig, SeverityConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AnalysisConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.severity.validate());
        errors.extend(self.hierarchy.validate());
        errors
    }
}

impl Validatable for SeverityConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        for method in &self.preferred_rating_methods {
            if !KNOWN_RATING_METHODS.contains(&method.as_str()) {
                errors.push(ConfigError {
                    field: "severity.preferred_rating_methods".to_string(),
                    message: format!(
                        "Unknown rating method '{}'. Valid options: {}",
                        method,
                        KNOWN_RATING_METHODS.join(", ")
                    ),
                });
            }
        }
        errors
    }
}

impl Validatable for HierarchyConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.label_preview_limit == 0 {
            errors.push(ConfigError {
                field: "hierarchy.label_preview_limit".to_string(),
                message: "Preview limit must be at least 1".to_string(),
            });
        }
        errors
    }
}
