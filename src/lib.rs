//! **Vulnerability-annotated dependency hierarchies from CycloneDX SBOMs.**
//!
//! `sbom-vulntree` reads a CycloneDX-shaped SBOM (components, dependency edges
//! and known vulnerabilities), works out which components are affected
//! directly and which only through their dependencies, and lays the result
//! out as nested weighted trees ready for a sunburst or treemap renderer.
//!
//! Real-world SBOMs are messy, so the analysis is tolerant throughout:
//! missing fields take defaults, dangling references are dropped, and
//! dependency cycles (self-loops included) are handled without recursion
//! blowing up.
//!
//! ## Core Concepts & Modules
//!
//! - **[`model`]**: the [`ComponentGraph`] of [`ComponentNode`]s, the [`Severity`]
//!   ranking and [`VulnerabilityRecord`]s.
//! - **[`parsers`]**: tolerant access to the raw JSON document.
//! - **[`analysis`]**: graph building, vulnerability mapping, transitive
//!   propagation, hierarchy materialization and summaries.
//! - **[`pipeline`]**: one-call entry points running every stage.
//! - **[`config`]**: [`AnalysisConfig`], presets and YAML config files.
//!
//! ## Getting Started
//!
//! ```
//! use sbom_vulntree::{analyze, NodeStyle, Severity};
//! use serde_json::json;
//!
//! let sbom = json!({
//!     "components": [
//!         {"bom-ref": "app", "name": "app", "version": "1.0.0"},
//!         {"bom-ref": "lib", "name": "lib", "version": "0.3.1"}
//!     ],
//!     "dependencies": [{"ref": "app", "dependsOn": ["lib"]}],
//!     "vulnerabilities": [{
//!         "id": "CVE-2024-0001",
//!         "ratings": [{"severity": "high", "score": 7.5}],
//!         "affects": [{"ref": "lib"}]
//!     }]
//! });
//!
//! let analysis = analyze(&sbom);
//! assert_eq!(analysis.summary.components, 2);
//! assert_eq!(analysis.summary.high, 1);
//!
//! let app = &analysis.full_view[0];
//! assert_eq!(app.style, NodeStyle::Transitive);
//! assert_eq!(app.children[0].style, NodeStyle::High);
//! assert_eq!(
//!     analysis.graph.get("lib").map(|n| n.max_severity),
//!     Some(Severity::High)
//! );
//! ```
//!
//! ### Reading a file
//!
//! ```no_run
//! use std::path::Path;
//! use sbom_vulntree::{analyze_file, AnalysisConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let analysis = analyze_file(Path::new("bom.json"), &AnalysisConfig::default())?;
//!     for (id, entry) in analysis.vulnerability_index.iter() {
//!         println!(
//!             "{id}: {} direct, {} transitive",
//!             entry.direct.len(),
//!             entry.transitive.len()
//!         );
//!     }
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // # Errors sections are not written for the thin pipeline wrappers
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Hierarchy config legitimately carries several toggle flags
    clippy::struct_excessive_bools,
    // Variable names like `direct`/`inherited` are clear in context
    clippy::similar_names
)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod pipeline;

// Re-export main types for convenience
pub use analysis::{
    HierarchyNode, NodeLabel, NodeStyle, PropagationOutcome, SummaryCounts, VulnerabilityIndex,
};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigPreset};
pub use config::{ConfigError, Validatable};
pub use error::{ErrorContext, ParseErrorKind, Result, SbomAnalysisError};
pub use model::{
    ComponentGraph, ComponentId, ComponentNode, DocumentMetadata, Severity, VulnerabilityList,
    VulnerabilityRecord,
};
pub use pipeline::{
    analyze, analyze_batch, analyze_document, analyze_file, analyze_str, analyze_with_config,
    SbomAnalysis,
};
