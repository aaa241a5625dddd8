//! Loading and analyzing SBOM files.

use super::analyze::{analyze_str, SbomAnalysis};
use crate::config::AnalysisConfig;
use crate::error::SbomAnalysisError;
use anyhow::Context;
use std::path::Path;

/// Read, parse and analyze an SBOM file, with the path in error messages.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> anyhow::Result<SbomAnalysis> {
    tracing::info!("Analyzing SBOM: {:?}", path);

    let raw_content = std::fs::read_to_string(path)
        .map_err(|e| SbomAnalysisError::io(path, e))
        .context("Failed to read SBOM file")?;
    let analysis = analyze_str(&raw_content, config)
        .with_context(|| format!("Failed to parse SBOM: {}", path.display()))?;

    tracing::info!(
        "Analyzed {} components, {} vulnerabilities",
        analysis.summary.components,
        analysis.summary.vulnerabilities
    );
    Ok(analysis)
}
