//! Identity-keyed component graph.
//!
//! [`ComponentGraph`] is an ordered map from [`ComponentId`] to [`ComponentNode`].
//! Iteration follows insertion order, which is the order components first
//! appear in the SBOM. The hierarchy sweep for unvisited components depends on
//! this order, so it is part of the type's contract rather than an accident of
//! the container.

use super::{ComponentId, ComponentNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use xxhash_rust::xxh3::xxh3_64;

/// Directed component graph with mutual `depends_on`/`dependency_of` edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentGraph {
    nodes: IndexMap<ComponentId, ComponentNode>,
}

impl ComponentGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. The first node for an identity wins; returns `false`
    /// and leaves the graph untouched when the identity is already present.
    pub fn insert(&mut self, node: ComponentNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Add the edge `from -> to` on both endpoints.
    ///
    /// Returns `false` if either endpoint is unknown. Self-edges are allowed.
    pub fn add_edge(&mut self, from: &ComponentId, to: &ComponentId) -> bool {
        if !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            return false;
        }
        if let Some(node) = self.nodes.get_mut(from) {
            node.depends_on.insert(to.clone());
        }
        if let Some(node) = self.nodes.get_mut(to) {
            node.dependency_of.insert(from.clone());
        }
        true
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ComponentNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ComponentNode> {
        self.nodes.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut ComponentNode> {
        self.nodes.values_mut()
    }

    /// Identities in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.nodes.keys()
    }

    /// Nodes without a declared parent, in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.values().filter(|n| n.is_root())
    }

    /// All `(from, to)` edges, grouped by source in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&ComponentId, &ComponentId)> {
        self.nodes
            .values()
            .flat_map(|n| n.depends_on.iter().map(move |to| (&n.id, to)))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.depends_on.len()).sum()
    }

    /// Subgraph of components with direct or transitive vulnerabilities.
    ///
    /// Retained nodes are independent copies; their edge sets are filtered so
    /// both endpoints of every edge are retained.
    #[must_use]
    pub fn vulnerable_only(&self) -> Self {
        let mut nodes: IndexMap<ComponentId, ComponentNode> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.is_affected())
            .map(|(id, n)| (id.clone(), n.clone()))
            .collect();

        let retained: HashSet<ComponentId> = nodes.keys().cloned().collect();
        for node in nodes.values_mut() {
            node.depends_on.retain(|id| retained.contains(id));
            node.dependency_of.retain(|id| retained.contains(id));
        }

        Self { nodes }
    }

    /// Hash of the graph structure and annotations.
    ///
    /// Covers identities, edges, severities and vulnerability ids in graph
    /// order, so two analyses of the same document hash equal.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        let mut hasher_input = Vec::new();

        for node in self.nodes.values() {
            hasher_input.extend(node.id.as_str().as_bytes());
            hasher_input.push(0);
            hasher_input.extend(node.max_severity.label().as_bytes());
            hasher_input.push(u8::from(node.has_transitive_vulnerabilities));
            for to in &node.depends_on {
                hasher_input.extend(to.as_str().as_bytes());
                hasher_input.push(1);
            }
            for id in node.direct_vulnerabilities.ids() {
                hasher_input.extend(id.as_bytes());
                hasher_input.push(2);
            }
            for id in node.transitive_vulnerabilities.ids() {
                hasher_input.extend(id.as_bytes());
                hasher_input.push(3);
            }
        }

        xxh3_64(&hasher_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, VulnerabilityRecord};

    fn id(s: &str) -> ComponentId {
        ComponentId::new(s).expect("non-empty id")
    }

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> ComponentGraph {
        let mut g = ComponentGraph::new();
        for name in ids {
            g.insert(ComponentNode::new(id(name)).with_name(*name));
        }
        for (from, to) in edges {
            g.add_edge(&id(from), &id(to));
        }
        g
    }

    #[test]
    fn test_first_insert_wins() {
        let mut g = ComponentGraph::new();
        assert!(g.insert(ComponentNode::new(id("a")).with_name("first")));
        assert!(!g.insert(ComponentNode::new(id("a")).with_name("second")));
        assert_eq!(g.len(), 1);
        assert_eq!(g.get("a").map(|n| n.name.as_str()), Some("first"));
    }

    #[test]
    fn test_edges_are_mutual() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        assert!(g.get("a").is_some_and(|n| n.depends_on.contains("b")));
        assert!(g.get("b").is_some_and(|n| n.dependency_of.contains("a")));
        assert_eq!(g.roots().map(|n| n.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut g = graph(&["a"], &[]);
        assert!(!g.add_edge(&id("a"), &id("missing")));
        assert!(!g.add_edge(&id("missing"), &id("a")));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_self_edge_kept() {
        let g = graph(&["a"], &[("a", "a")]);
        assert_eq!(g.edge_count(), 1);
        assert!(!g.get("a").is_some_and(ComponentNode::is_root));
    }

    #[test]
    fn test_vulnerable_only_filters_edges() {
        let mut g = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        if let Some(b) = g.get_mut("b") {
            b.add_direct_vulnerability(VulnerabilityRecord::new("V1", Severity::High, 7.0));
        }
        if let Some(a) = g.get_mut("a") {
            a.transitive_vulnerabilities
                .insert(VulnerabilityRecord::new("V1", Severity::High, 7.0));
        }

        let reduced = g.vulnerable_only();
        assert_eq!(reduced.ids().map(ComponentId::as_str).collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(reduced.get("a").is_some_and(|n| !n.depends_on.contains("c")));
        // the source graph is untouched
        assert!(g.get("a").is_some_and(|n| n.depends_on.contains("c")));
    }

    #[test]
    fn test_content_hash_tracks_edges() {
        let a = graph(&["a", "b"], &[("a", "b")]);
        let b = graph(&["a", "b"], &[("a", "b")]);
        let c = graph(&["a", "b"], &[("b", "a")]);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
