//! Aggregate counts and the per-vulnerability index of an analyzed graph.

use crate::model::{ComponentGraph, ComponentId, Severity, VulnerabilityRecord};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Headline numbers of an analysis.
///
/// Vulnerabilities are counted once per id, under the severity of the first
/// record seen in graph order. Only vulnerabilities attached to at least one
/// component are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub components: usize,
    pub dependencies: usize,
    pub vulnerabilities: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub unknown: usize,
    /// Components with at least one direct vulnerability
    pub vulnerable_components: usize,
    /// Components with at least one vulnerable descendant
    pub transitively_affected_components: usize,
}

impl SummaryCounts {
    #[must_use]
    pub fn from_graph(graph: &ComponentGraph) -> Self {
        let mut counts = Self {
            components: graph.len(),
            dependencies: graph.edge_count(),
            ..Self::default()
        };

        let mut seen: HashSet<&str> = HashSet::new();
        for node in graph.nodes() {
            if node.is_directly_vulnerable() {
                counts.vulnerable_components += 1;
            }
            if node.has_transitive_vulnerabilities {
                counts.transitively_affected_components += 1;
            }
            for vuln in &node.direct_vulnerabilities {
                if seen.insert(vuln.id.as_str()) {
                    counts.record(vuln.severity);
                }
            }
        }

        counts
    }

    fn record(&mut self, severity: Severity) {
        self.vulnerabilities += 1;
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
            Severity::Clean | Severity::Unknown => self.unknown += 1,
        }
    }

    /// Count for one severity bucket. `Clean` reads the `unknown` bucket.
    #[must_use]
    pub const fn count_for(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
            Severity::Clean | Severity::Unknown => self.unknown,
        }
    }
}

/// A vulnerability with the components it affects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityEntry {
    /// First record seen for this id
    pub record: VulnerabilityRecord,
    /// Components the vulnerability is attached to
    pub direct: IndexSet<ComponentId>,
    /// Components that reach an affected component
    pub transitive: IndexSet<ComponentId>,
}

/// Vulnerability id to affected components, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VulnerabilityIndex {
    entries: IndexMap<String, VulnerabilityEntry>,
}

impl VulnerabilityIndex {
    #[must_use]
    pub fn from_graph(graph: &ComponentGraph) -> Self {
        let mut entries: IndexMap<String, VulnerabilityEntry> = IndexMap::new();

        for node in graph.nodes() {
            for vuln in &node.direct_vulnerabilities {
                entries
                    .entry(vuln.id.clone())
                    .or_insert_with(|| VulnerabilityEntry {
                        record: vuln.clone(),
                        direct: IndexSet::new(),
                        transitive: IndexSet::new(),
                    })
                    .direct
                    .insert(node.id.clone());
            }
        }

        for node in graph.nodes() {
            for vuln in &node.transitive_vulnerabilities {
                if let Some(entry) = entries.get_mut(vuln.id.as_str()) {
                    entry.transitive.insert(node.id.clone());
                }
            }
        }

        Self { entries }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VulnerabilityEntry> {
        self.entries.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VulnerabilityEntry)> {
        self.entries.iter().map(|(id, entry)| (id.as_str(), entry))
    }
}
