//! In-memory analysis of parsed SBOM documents.

use crate::analysis::{
    build_graph, map_vulnerabilities, materialize, propagate, HierarchyNode, SummaryCounts,
    VulnerabilityIndex,
};
use crate::config::AnalysisConfig;
use crate::error::{ErrorContext, Result};
use crate::model::{ComponentGraph, ComponentId, DocumentMetadata};
use crate::parsers::{extract_metadata, parse_document_str, require_object, RawSbom};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

/// Everything derived from one SBOM document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SbomAnalysis {
    /// Display metadata of the document
    pub metadata: DocumentMetadata,
    /// Annotated component graph
    pub graph: ComponentGraph,
    /// Forest over the whole graph
    pub full_view: Vec<HierarchyNode>,
    /// Forest over the vulnerable-only projection; empty when disabled
    pub vulnerable_view: Vec<HierarchyNode>,
    pub summary: SummaryCounts,
    pub vulnerability_index: VulnerabilityIndex,
    /// Dependency cycles, each closing on its first component
    pub cycles: Vec<Vec<ComponentId>>,
    /// How many vulnerabilities and licenses a node label should list
    pub label_preview_limit: usize,
}

impl SbomAnalysis {
    /// True when the document contributed no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

/// Analyze `document` with the default configuration.
///
/// Never fails: a document that is not a JSON object yields an empty analysis.
#[must_use]
pub fn analyze(document: &Value) -> SbomAnalysis {
    analyze_with_config(document, &AnalysisConfig::default())
}

/// Analyze `document` with `config`.
///
/// Never fails: a document that is not a JSON object is logged and yields an
/// empty analysis.
#[must_use]
pub fn analyze_with_config(document: &Value, config: &AnalysisConfig) -> SbomAnalysis {
    analyze_document(document, config).unwrap_or_else(|e| {
        tracing::warn!("{}; returning empty analysis", e);
        SbomAnalysis {
            label_preview_limit: config.hierarchy.label_preview_limit,
            ..SbomAnalysis::default()
        }
    })
}

/// Analyze `document` with `config`, reporting a non-object document as an error.
pub fn analyze_document(document: &Value, config: &AnalysisConfig) -> Result<SbomAnalysis> {
    let document = require_object(document)?;
    Ok(run_stages(document, config))
}

/// Parse JSON text and analyze it.
///
/// Fails on invalid JSON and on a top-level value that is not an object.
pub fn analyze_str(content: &str, config: &AnalysisConfig) -> Result<SbomAnalysis> {
    let document = parse_document_str(content)?;
    analyze_document(&document, config).context("analyzing SBOM document")
}

/// Analyze independent documents in parallel.
///
/// Results are in input order and equal to analyzing each document on its own.
#[must_use]
pub fn analyze_batch(documents: &[Value], config: &AnalysisConfig) -> Vec<SbomAnalysis> {
    documents
        .par_iter()
        .map(|document| analyze_with_config(document, config))
        .collect()
}

fn run_stages(document: &Value, config: &AnalysisConfig) -> SbomAnalysis {
    let raw = RawSbom::from_document(document);
    let metadata = extract_metadata(document);

    let mut graph = build_graph(&raw);
    map_vulnerabilities(&mut graph, raw.vulnerabilities, &config.severity);
    let outcome = propagate(&mut graph, config.hierarchy.warn_on_cycles);

    let full_view = materialize(&graph);
    let vulnerable_view = if config.hierarchy.include_vulnerable_view {
        materialize(&graph.vulnerable_only())
    } else {
        Vec::new()
    };

    let summary = SummaryCounts::from_graph(&graph);
    let vulnerability_index = VulnerabilityIndex::from_graph(&graph);

    tracing::info!(
        components = summary.components,
        vulnerabilities = summary.vulnerabilities,
        cycles = outcome.cycles.len(),
        "Analyzed SBOM"
    );

    SbomAnalysis {
        metadata,
        graph,
        full_view,
        vulnerable_view,
        summary,
        vulnerability_index,
        cycles: outcome.cycles,
        label_preview_limit: config.hierarchy.label_preview_limit,
    }
}
