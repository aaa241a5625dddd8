//! Analysis stages.
//!
//! The stages run in dependency order, each consuming the output of the
//! previous one:
//!
//! 1. [`build_graph`]: component and dependency records into a [`ComponentGraph`]
//! 2. [`map_vulnerabilities`]: vulnerability records onto components
//! 3. [`propagate`]: transitive vulnerabilities over dependency edges
//! 4. [`materialize`]: the graph as a forest of [`HierarchyNode`]s
//!
//! [`SummaryCounts`] and [`VulnerabilityIndex`] summarize the annotated graph.
//!
//! [`ComponentGraph`]: crate::model::ComponentGraph

mod builder;
mod hierarchy;
mod propagation;
mod summary;
mod vulnerabilities;

pub use builder::{build_graph, component_from_record, component_identity};
pub use hierarchy::{flatten, materialize, HierarchyNode, NodeLabel, NodeStyle};
pub use propagation::{dependency_cycles, format_chain, propagate, PropagationOutcome};
pub use summary::{SummaryCounts, VulnerabilityEntry, VulnerabilityIndex};
pub use vulnerabilities::{
    affected_refs, map_vulnerabilities, vulnerability_from_record, MappingStats,
    UNKNOWN_VULNERABILITY_ID,
};
