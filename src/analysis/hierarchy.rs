//! Materialization of the component graph into nested weighted trees.
//!
//! Each root component becomes one tree. A component reachable through
//! several parents appears once under each of them. A dependency pointing back
//! to a component already on the current path is emitted as a `cyclic` leaf
//! of weight 1 and not expanded further.

use crate::model::{ComponentGraph, ComponentId, ComponentNode, Severity, VulnerabilityRecord};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Display category of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStyle {
    Critical,
    High,
    Medium,
    Low,
    Info,
    /// No direct vulnerability, but a vulnerable descendant
    Transitive,
    Clean,
}

impl NodeStyle {
    /// Style of `node`: its worst direct severity, else `Transitive` when a
    /// descendant is vulnerable, else `Clean`.
    #[must_use]
    pub const fn for_node(node: &ComponentNode) -> Self {
        match node.max_severity {
            Severity::Critical => Self::Critical,
            Severity::High => Self::High,
            Severity::Medium => Self::Medium,
            Severity::Low => Self::Low,
            Severity::Info => Self::Info,
            Severity::Clean | Severity::Unknown if node.has_transitive_vulnerabilities => {
                Self::Transitive
            }
            Severity::Clean | Severity::Unknown => Self::Clean,
        }
    }

    /// Fill color as a hex string.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Critical => "#a10a0a",
            Self::High => "#ff4633",
            Self::Medium => "#ff9335",
            Self::Low => "#fccd58",
            Self::Info => "#7dd491",
            Self::Transitive => "#9fc5e8",
            Self::Clean => "#bcbcbc",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
            Self::Transitive => "transitive",
            Self::Clean => "clean",
        }
    }
}

impl std::fmt::Display for NodeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Data a renderer needs to compose a node label.
///
/// Lists are complete; truncation for display is up to the renderer, helped
/// by the `*_preview` methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLabel {
    pub name: String,
    /// `None` when the component declares no version
    pub version: Option<String>,
    /// Direct vulnerabilities, worst first; ties keep insertion order
    pub vulnerabilities: Vec<VulnerabilityRecord>,
    pub licenses: Vec<String>,
}

impl NodeLabel {
    #[must_use]
    pub fn for_node(node: &ComponentNode) -> Self {
        Self {
            name: node.name.clone(),
            version: node.declared_version().map(str::to_string),
            vulnerabilities: node.direct_vulnerabilities.sorted_by_severity(),
            licenses: node.licenses.iter().cloned().collect(),
        }
    }

    /// The first `limit` vulnerabilities, and whether more exist.
    #[must_use]
    pub fn vulnerability_preview(&self, limit: usize) -> (&[VulnerabilityRecord], bool) {
        preview(&self.vulnerabilities, limit)
    }

    /// The first `limit` licenses, and whether more exist.
    #[must_use]
    pub fn license_preview(&self, limit: usize) -> (&[String], bool) {
        preview(&self.licenses, limit)
    }
}

fn preview<T>(items: &[T], limit: usize) -> (&[T], bool) {
    let shown = items.len().min(limit);
    (&items[..shown], items.len() > limit)
}

/// One node of a materialized tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: ComponentId,
    pub label: NodeLabel,
    /// Number of leaves below this node, 1 for a leaf
    pub weight: usize,
    pub children: Vec<HierarchyNode>,
    pub style: NodeStyle,
    /// This component or something in its subtree is directly vulnerable
    pub vulnerable_subtree: bool,
    /// Back-reference to an ancestor on the current path
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cyclic: bool,
}

impl HierarchyNode {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// This node and all its descendants, depth first.
    #[must_use]
    pub fn descendants(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

// Children are released from an explicit stack so that dropping a very deep
// tree does not recurse once per level.
impl Drop for HierarchyNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Every node of every tree in `roots`, depth first.
#[must_use]
pub fn flatten(roots: &[HierarchyNode]) -> Vec<&HierarchyNode> {
    roots.iter().flat_map(HierarchyNode::descendants).collect()
}

/// Materialize `graph` as a forest.
///
/// Declared roots (components without parents) come first in graph order.
/// Components still unreached afterwards, which only happens inside parentless
/// cycles, become additional roots so none is left out.
#[must_use]
pub fn materialize(graph: &ComponentGraph) -> Vec<HierarchyNode> {
    Materializer::new(graph).run()
}

/// A component whose children are being expanded.
struct Frame<'g> {
    node: &'g ComponentNode,
    next_child: usize,
    children: Vec<HierarchyNode>,
    weight: usize,
    vulnerable: bool,
}

impl<'g> Frame<'g> {
    fn new(node: &'g ComponentNode) -> Self {
        Self {
            node,
            next_child: 0,
            children: Vec::with_capacity(node.depends_on.len()),
            weight: 0,
            vulnerable: node.is_directly_vulnerable(),
        }
    }

    fn adopt(&mut self, child: HierarchyNode) {
        self.weight += child.weight;
        self.vulnerable |= child.vulnerable_subtree;
        self.children.push(child);
    }

    fn finish(self, cyclic: bool) -> HierarchyNode {
        HierarchyNode {
            id: self.node.id.clone(),
            label: NodeLabel::for_node(self.node),
            weight: self.weight.max(1),
            children: self.children,
            style: NodeStyle::for_node(self.node),
            vulnerable_subtree: self.vulnerable,
            cyclic,
        }
    }
}

struct Materializer<'g> {
    graph: &'g ComponentGraph,
    visited: HashSet<&'g ComponentId>,
}

impl<'g> Materializer<'g> {
    fn new(graph: &'g ComponentGraph) -> Self {
        Self {
            graph,
            visited: HashSet::with_capacity(graph.len()),
        }
    }

    fn run(mut self) -> Vec<HierarchyNode> {
        let graph = self.graph;
        let mut forest = Vec::new();

        for node in graph.roots() {
            forest.push(self.expand(node));
        }

        let declared = forest.len();
        for node in graph.nodes() {
            if !self.visited.contains(&node.id) {
                tracing::debug!(component = %node.id, "Adding unreached component as root");
                forest.push(self.expand(node));
            }
        }

        tracing::debug!(
            roots = declared,
            synthetic_roots = forest.len() - declared,
            "Materialized hierarchy"
        );
        forest
    }

    /// Depth-first expansion of the tree under `root`. `path` holds the
    /// component being expanded and its ancestors; `stack` holds the
    /// unfinished ancestors themselves.
    fn expand(&mut self, root: &'g ComponentNode) -> HierarchyNode {
        self.visited.insert(&root.id);
        let mut path: IndexSet<&'g ComponentId> = IndexSet::from([&root.id]);
        let mut stack: Vec<Frame<'g>> = Vec::new();
        let mut current = Frame::new(root);

        loop {
            let node = current.node;
            if let Some(child_id) = node.depends_on.get_index(current.next_child) {
                current.next_child += 1;
                let Some(child) = self.graph.get(child_id.as_str()) else {
                    continue;
                };
                self.visited.insert(&child.id);

                if path.contains(&child.id) {
                    current.adopt(Frame::new(child).finish(true));
                } else {
                    path.insert(&child.id);
                    stack.push(std::mem::replace(&mut current, Frame::new(child)));
                }
                continue;
            }

            let finished = current.finish(false);
            let Some(parent) = stack.pop() else {
                return finished;
            };
            path.pop();
            current = parent;
            current.adopt(finished);
        }
    }
}
