//! Transitive vulnerability propagation.
//!
//! Every node receives the union, deduplicated by id, of the direct
//! vulnerabilities of all other nodes reachable from it through one or more
//! `depends_on` edges. A node never inherits its own records back through a
//! dependency cycle. The same id can still sit in both of its lists when some
//! other reachable node carries it too.
//!
//! Reachability is resolved over strongly connected components, so the cost
//! is linear in the graph size plus the size of the produced lists, whatever
//! the cycle structure. Results are folded into per-node lists and written
//! back to the graph in one pass once every component has been resolved.
//!
//! List order follows `depends_on` order: for each child, its direct
//! vulnerabilities first, then the ones it inherited. Members of a cycle then
//! append what the rest of the cycle carries.

use crate::model::{ComponentGraph, ComponentId, VulnerabilityList, VulnerabilityRecord};
use indexmap::IndexMap;
use std::collections::{hash_map::Entry, HashMap, VecDeque};

/// Result of one propagation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationOutcome {
    /// One chain per dependency cycle, starting and ending at the same component
    pub cycles: Vec<Vec<ComponentId>>,
    /// Components with at least one vulnerable descendant
    pub transitively_affected: usize,
}

/// Fill `transitive_vulnerabilities` and `has_transitive_vulnerabilities` for
/// every node of `graph`.
///
/// Direct vulnerabilities and `max_severity` are read, never modified. With
/// `warn_on_cycles`, each dependency cycle is logged at warn level.
pub fn propagate(graph: &mut ComponentGraph, warn_on_cycles: bool) -> PropagationOutcome {
    let topology = Topology::of(graph);
    let components = topology.strongly_connected_components();

    let mut cycles = Vec::new();
    let mut inherited: Vec<Option<VulnerabilityList>> = vec![None; topology.len()];
    let direct: Vec<&VulnerabilityList> = graph.nodes().map(|n| &n.direct_vulnerabilities).collect();

    // Tarjan emits components sinks first, so every successor outside the
    // current component is already resolved.
    for members in &components {
        if topology.is_cyclic(members) {
            let chain = topology.cycle_chain(members);
            if warn_on_cycles {
                tracing::warn!(chain = %format_chain(&chain), "Circular dependency detected");
            }
            cycles.push(chain);
            resolve_cycle(&topology, members, &direct, &mut inherited);
        } else {
            for &v in members {
                let mut list = VulnerabilityList::new();
                for &child in &topology.adjacency[v] {
                    list.extend_from(direct[child]);
                    if let Some(child_list) = &inherited[child] {
                        list.extend_from(child_list);
                    }
                }
                inherited[v] = Some(list);
            }
        }
    }

    let mut transitively_affected = 0;
    for (node, list) in graph.nodes_mut().zip(inherited) {
        let list = list.unwrap_or_default();
        node.has_transitive_vulnerabilities = !list.is_empty();
        if node.has_transitive_vulnerabilities {
            transitively_affected += 1;
        }
        node.transitive_vulnerabilities = list;
    }

    tracing::debug!(
        cycles = cycles.len(),
        transitively_affected,
        "Propagated transitive vulnerabilities"
    );
    PropagationOutcome {
        cycles,
        transitively_affected,
    }
}

/// Dependency cycles of `graph`, one chain per strongly connected component
/// with a cycle (self-loops included), in graph order of their first member.
#[must_use]
pub fn dependency_cycles(graph: &ComponentGraph) -> Vec<Vec<ComponentId>> {
    let topology = Topology::of(graph);
    let mut chains: Vec<(usize, Vec<ComponentId>)> = topology
        .strongly_connected_components()
        .iter()
        .filter(|members| topology.is_cyclic(members))
        .map(|members| (members[0], topology.cycle_chain(members)))
        .collect();
    chains.sort_by_key(|(first, _)| *first);
    chains.into_iter().map(|(_, chain)| chain).collect()
}

/// Render a cycle as `a --> b --> a`.
#[must_use]
pub fn format_chain(chain: &[ComponentId]) -> String {
    chain
        .iter()
        .map(ComponentId::as_str)
        .collect::<Vec<_>>()
        .join(" --> ")
}

/// Every member of a multi-node cycle reaches every other member and all
/// that lies beyond the cycle. A member's own records only come back to it
/// when another member carries the same id.
fn resolve_cycle(
    topology: &Topology,
    members: &[usize],
    direct: &[&VulnerabilityList],
    inherited: &mut [Option<VulnerabilityList>],
) {
    let in_cycle = |v: usize| members.binary_search(&v).is_ok();

    let mut external = VulnerabilityList::new();
    for &m in members {
        for &child in topology.adjacency[m].iter().filter(|&&c| !in_cycle(c)) {
            external.extend_from(direct[child]);
            if let Some(child_list) = &inherited[child] {
                external.extend_from(child_list);
            }
        }
    }

    // id -> (first record, number of members carrying it directly)
    let mut carried: IndexMap<&str, (&VulnerabilityRecord, usize)> = IndexMap::new();
    if members.len() > 1 {
        for &m in members {
            for record in direct[m] {
                carried.entry(record.id.as_str()).or_insert((record, 0)).1 += 1;
            }
        }
    }

    for &v in members {
        let mut list = VulnerabilityList::new();
        for &child in &topology.adjacency[v] {
            if child == v {
                continue;
            }
            list.extend_from(direct[child]);
            if !in_cycle(child) {
                if let Some(child_list) = &inherited[child] {
                    list.extend_from(child_list);
                }
            }
        }
        for (id, (record, carriers)) in &carried {
            if *carriers > 1 || !direct[v].contains(id) {
                list.insert((*record).clone());
            }
        }
        list.extend_from(&external);
        inherited[v] = Some(list);
    }
}

/// Index-based view of the graph edges, in graph order.
struct Topology {
    ids: Vec<ComponentId>,
    adjacency: Vec<Vec<usize>>,
}

impl Topology {
    fn of(graph: &ComponentGraph) -> Self {
        let position: HashMap<&str, usize> = graph
            .ids()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let adjacency = graph
            .nodes()
            .map(|node| {
                node.depends_on
                    .iter()
                    .filter_map(|child| position.get(child.as_str()).copied())
                    .collect()
            })
            .collect();

        Self {
            ids: graph.ids().cloned().collect(),
            adjacency,
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    /// More than one member, or a single member depending on itself.
    fn is_cyclic(&self, members: &[usize]) -> bool {
        match members {
            [single] => self.adjacency[*single].contains(single),
            _ => !members.is_empty(),
        }
    }

    /// Shortest chain from the first member back to itself, staying inside
    /// the component.
    fn cycle_chain(&self, members: &[usize]) -> Vec<ComponentId> {
        let Some(&start) = members.first() else {
            return Vec::new();
        };
        let in_cycle = |v: usize| members.binary_search(&v).is_ok();

        let mut parent: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        let mut closing = None;

        'search: while let Some(u) = queue.pop_front() {
            for &v in self.adjacency[u].iter().filter(|&&v| in_cycle(v)) {
                if v == start {
                    closing = Some(u);
                    break 'search;
                }
                if let Entry::Vacant(e) = parent.entry(v) {
                    e.insert(u);
                    queue.push_back(v);
                }
            }
        }

        let mut path = vec![start];
        let mut cursor = closing;
        while let Some(u) = cursor.filter(|&u| u != start) {
            path.push(u);
            cursor = parent.get(&u).copied();
        }
        path.push(start);
        // path is start, last, ..., first, start
        let end = path.len() - 1;
        path[1..end].reverse();
        path.into_iter().map(|i| self.ids[i].clone()).collect()
    }

    /// Tarjan's algorithm over an explicit call stack. Components come out in
    /// reverse topological order, members sorted by graph position.
    fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        let mut tarjan = Tarjan::new(self.len());
        // (node, next edge to follow)
        let mut call: Vec<(usize, usize)> = Vec::new();

        for root in 0..self.len() {
            if tarjan.index[root].is_some() {
                continue;
            }
            tarjan.discover(root);
            call.push((root, 0));

            while let Some(&(v, edge)) = call.last() {
                if let Some(&w) = self.adjacency[v].get(edge) {
                    if let Some(frame) = call.last_mut() {
                        frame.1 = edge + 1;
                    }
                    match tarjan.index[w] {
                        None => {
                            tarjan.discover(w);
                            call.push((w, 0));
                        }
                        Some(w_index) if tarjan.on_stack[w] => {
                            tarjan.lowlink[v] = tarjan.lowlink[v].min(w_index);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                call.pop();
                if let Some(&(caller, _)) = call.last() {
                    tarjan.lowlink[caller] = tarjan.lowlink[caller].min(tarjan.lowlink[v]);
                }
                if Some(tarjan.lowlink[v]) == tarjan.index[v] {
                    tarjan.close_component(v);
                }
            }
        }
        tarjan.components
    }
}

struct Tarjan {
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl Tarjan {
    fn new(n: usize) -> Self {
        Self {
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn discover(&mut self, v: usize) {
        self.index[v] = Some(self.next_index);
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }

    /// Pop the component rooted at `v`.
    fn close_component(&mut self, v: usize) {
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            self.on_stack[w] = false;
            component.push(w);
            if w == v {
                break;
            }
        }
        component.sort_unstable();
        self.components.push(component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComponentNode, Severity};

    fn id(s: &str) -> ComponentId {
        ComponentId::new(s).expect("non-empty id")
    }

    fn graph(ids: &[&str], edges: &[(&str, &str)], vulns: &[(&str, &str, Severity)]) -> ComponentGraph {
        let mut g = ComponentGraph::new();
        for name in ids {
            g.insert(ComponentNode::new(id(name)).with_name(*name));
        }
        for (from, to) in edges {
            g.add_edge(&id(from), &id(to));
        }
        for (target, vuln, severity) in vulns {
            if let Some(node) = g.get_mut(target) {
                node.add_direct_vulnerability(VulnerabilityRecord::new(*vuln, *severity, 0.0));
                node.refresh_max_severity();
            }
        }
        g
    }

    fn transitive_ids(g: &ComponentGraph, node: &str) -> Vec<String> {
        g.get(node)
            .map(|n| n.transitive_vulnerabilities.ids().map(str::to_string).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_chain_propagates_to_all_ancestors() {
        let mut g = graph(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c")],
            &[("c", "V1", Severity::High), ("b", "V2", Severity::Low)],
        );
        let outcome = propagate(&mut g, false);

        assert_eq!(transitive_ids(&g, "a"), vec!["V2", "V1"]);
        assert_eq!(transitive_ids(&g, "b"), vec!["V1"]);
        assert!(transitive_ids(&g, "c").is_empty());
        assert!(g.get("a").is_some_and(|n| n.has_transitive_vulnerabilities));
        assert!(!g.get("c").is_some_and(|n| n.has_transitive_vulnerabilities));
        assert_eq!(outcome.transitively_affected, 2);
        assert!(outcome.cycles.is_empty());
    }

    #[test]
    fn test_max_severity_untouched() {
        let mut g = graph(&["a", "b"], &[("a", "b")], &[("b", "V1", Severity::Critical)]);
        propagate(&mut g, false);
        assert_eq!(g.get("a").map(|n| n.max_severity), Some(Severity::Clean));
        assert_eq!(g.get("b").map(|n| n.max_severity), Some(Severity::Critical));
    }

    #[test]
    fn test_diamond_dedups_by_id() {
        let mut g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
            &[("d", "V1", Severity::Medium), ("c", "V1", Severity::Medium)],
        );
        propagate(&mut g, false);
        assert_eq!(transitive_ids(&g, "a"), vec!["V1"]);
    }

    #[test]
    fn test_two_cycle_terminates_without_self_inheritance() {
        let mut g = graph(&["a", "b"], &[("a", "b"), ("b", "a")], &[("b", "V1", Severity::High)]);
        let outcome = propagate(&mut g, true);

        assert_eq!(transitive_ids(&g, "a"), vec!["V1"]);
        // b only reaches a, which carries nothing
        assert!(transitive_ids(&g, "b").is_empty());
        assert!(!g.get("b").is_some_and(|n| n.has_transitive_vulnerabilities));
        assert_eq!(outcome.transitively_affected, 1);
        assert_eq!(outcome.cycles, vec![vec![id("a"), id("b"), id("a")]]);
    }

    #[test]
    fn test_self_loop() {
        let mut g = graph(&["a"], &[("a", "a")], &[("a", "V1", Severity::Low)]);
        let outcome = propagate(&mut g, false);
        assert!(transitive_ids(&g, "a").is_empty());
        assert_eq!(outcome.transitively_affected, 0);
        assert_eq!(outcome.cycles, vec![vec![id("a"), id("a")]]);
    }

    #[test]
    fn test_cycle_members_inherit_each_other_only() {
        let mut g = graph(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "a")],
            &[
                ("a", "VA", Severity::Low),
                ("b", "VB", Severity::Medium),
                ("c", "VC", Severity::High),
            ],
        );
        propagate(&mut g, false);

        assert_eq!(transitive_ids(&g, "a"), vec!["VB", "VC"]);
        assert_eq!(transitive_ids(&g, "b"), vec!["VC", "VA"]);
        assert_eq!(transitive_ids(&g, "c"), vec!["VA", "VB"]);
        for node in g.nodes() {
            for own in node.direct_vulnerabilities.ids() {
                assert!(!node.transitive_vulnerabilities.contains(own), "{} inherits {own}", node.id);
            }
        }
    }

    #[test]
    fn test_id_shared_inside_cycle_is_inherited() {
        let mut g = graph(
            &["a", "b"],
            &[("a", "b"), ("b", "a")],
            &[("a", "V1", Severity::High), ("b", "V1", Severity::High)],
        );
        propagate(&mut g, false);
        // each reaches the other's copy of V1
        assert_eq!(transitive_ids(&g, "a"), vec!["V1"]);
        assert_eq!(transitive_ids(&g, "b"), vec!["V1"]);
    }

    #[test]
    fn test_self_loop_still_inherits_from_children() {
        let mut g = graph(
            &["a", "b"],
            &[("a", "a"), ("a", "b")],
            &[("a", "V1", Severity::Low), ("b", "V2", Severity::High)],
        );
        propagate(&mut g, false);
        assert_eq!(transitive_ids(&g, "a"), vec!["V2"]);
    }

    #[test]
    fn test_cycle_inherits_from_outside_successors() {
        let mut g = graph(
            &["root", "a", "b", "leaf"],
            &[("root", "a"), ("a", "b"), ("b", "a"), ("b", "leaf")],
            &[("leaf", "V9", Severity::Critical)],
        );
        propagate(&mut g, false);
        assert_eq!(transitive_ids(&g, "root"), vec!["V9"]);
        assert_eq!(transitive_ids(&g, "a"), vec!["V9"]);
        assert_eq!(transitive_ids(&g, "b"), vec!["V9"]);
        assert!(transitive_ids(&g, "leaf").is_empty());
    }

    #[test]
    fn test_cycle_chain_shortest_path() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("b", "d")],
            &[],
        );
        let cycles = dependency_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(format_chain(&cycles[0]), "a --> b --> c --> a");
    }

    #[test]
    fn test_chain_of_longer_cycle_and_self_loop() {
        let g = graph(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "a"), ("b", "a"), ("e", "e")],
            &[],
        );
        let chains: Vec<String> = dependency_cycles(&g).iter().map(|c| format_chain(c)).collect();
        assert_eq!(chains, vec!["a --> b --> a", "e --> e"]);
        assert_eq!(format_chain(&[]), "");
    }

    #[test]
    fn test_deep_chain_does_not_exhaust_stack() {
        let depth = 20_000;
        let names: Vec<String> = (0..depth).map(|i| format!("n{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        let mut g = graph(&refs, &edges, &[(refs[depth - 1], "V1", Severity::High)]);

        let outcome = propagate(&mut g, false);
        assert_eq!(outcome.transitively_affected, depth - 1);
        assert_eq!(transitive_ids(&g, "n0"), vec!["V1"]);
        assert!(outcome.cycles.is_empty());
    }

    #[test]
    fn test_deep_cycle_does_not_exhaust_stack() {
        let depth = 20_000;
        let names: Vec<String> = (0..depth).map(|i| format!("n{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut edges: Vec<(&str, &str)> = refs.windows(2).map(|w| (w[0], w[1])).collect();
        edges.push((refs[depth - 1], refs[0]));
        let mut g = graph(&refs, &edges, &[(refs[0], "V1", Severity::High)]);

        let outcome = propagate(&mut g, false);
        assert_eq!(outcome.cycles.len(), 1);
        assert_eq!(outcome.cycles[0].len(), depth + 1);
        assert!(transitive_ids(&g, "n0").is_empty());
        assert_eq!(transitive_ids(&g, "n1"), vec!["V1"]);
    }

    #[test]
    fn test_propagation_is_idempotent() {
        let mut g = graph(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "b")],
            &[("c", "V1", Severity::High)],
        );
        propagate(&mut g, false);
        let first = g.content_hash();
        propagate(&mut g, false);
        assert_eq!(g.content_hash(), first);
    }
}
