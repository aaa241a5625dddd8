//! Configuration module for sbom-vulntree.
//!
//! This module provides:
//! - Type-safe configuration structures with serde defaults
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//!
//! # Quick Start
//!
//! ```rust
//! use sbom_vulntree::config::{AnalysisConfig, ConfigPreset, Validatable};
//!
//! // Use defaults
//! let config = AnalysisConfig::default();
//!
//! // Use a preset
//! let config = AnalysisConfig::from_preset(ConfigPreset::Cvss);
//!
//! // Use builder
//! let config = AnalysisConfig::builder()
//!     .derive_from_score(true)
//!     .label_preview_limit(5)
//!     .build();
//! assert!(config.is_valid());
//! ```
//!
//! # Configuration File
//!
//! Place a `.sbom-vulntree.yaml` file in your project root or `~/.config/sbom-vulntree/`:
//!
//! ```yaml
//! severity:
//!   preferred_rating_methods: [CVSSv31, CVSSv3]
//! hierarchy:
//!   warn_on_cycles: false
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    ConfigPreset, CVSS_RATING_PREFERENCE, DEFAULT_LABEL_PREVIEW_LIMIT, KNOWN_RATING_METHODS,
};
pub use types::{AnalysisConfig, AnalysisConfigBuilder, HierarchyConfig, SeverityConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    load_validated_config, ConfigFileError,
};

/// Generate a JSON Schema for the `AnalysisConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbom-vulntree.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> crate::error::Result<String> {
    let schema = schemars::schema_for!(AnalysisConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}
