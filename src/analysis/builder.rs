//! Graph construction from raw component and dependency records.

use crate::model::{
    ComponentGraph, ComponentId, ComponentNode, DEFAULT_COMPONENT_TYPE, NO_VERSION, UNKNOWN_NAME,
};
use crate::parsers::fields::{array_field, nested_str_field, str_field, text_field};
use crate::parsers::RawSbom;
use serde_json::Value;

/// Fields searched, in order, for a component's identity.
const IDENTITY_FIELDS: [&str; 4] = ["bom-ref", "bomRef", "purl", "name"];

/// Build the component graph of `raw`.
///
/// Components without an identity are skipped, as are duplicate identities
/// after the first. Dependency records whose `ref` or targets are unknown
/// contribute no edges.
#[must_use]
pub fn build_graph(raw: &RawSbom<'_>) -> ComponentGraph {
    let mut graph = ComponentGraph::new();

    for record in raw.components {
        let Some(node) = component_from_record(record) else {
            tracing::debug!("Skipping component without bom-ref, purl or name");
            continue;
        };
        let id = node.id.clone();
        if !graph.insert(node) {
            tracing::debug!(component = %id, "Duplicate component identity, keeping first");
        }
    }

    for record in raw.dependencies {
        add_dependency_edges(&mut graph, record);
    }

    tracing::debug!(
        components = graph.len(),
        edges = graph.edge_count(),
        "Built component graph"
    );
    graph
}

/// Identity of a component record: the first non-empty string among
/// `bom-ref`, `bomRef`, `purl` and `name`.
#[must_use]
pub fn component_identity(record: &Value) -> Option<ComponentId> {
    IDENTITY_FIELDS
        .iter()
        .find_map(|key| str_field(record, key))
        .and_then(ComponentId::new)
}

/// Convert one component record into an unconnected node.
#[must_use]
pub fn component_from_record(record: &Value) -> Option<ComponentNode> {
    let id = component_identity(record)?;

    let mut node = ComponentNode::new(id)
        .with_name(text_field(record, "name").unwrap_or_else(|| UNKNOWN_NAME.to_string()))
        .with_version(text_field(record, "version").unwrap_or_else(|| NO_VERSION.to_string()));
    node.component_type = str_field(record, "type")
        .unwrap_or(DEFAULT_COMPONENT_TYPE)
        .to_string();
    node.purl = str_field(record, "purl").map(str::to_string);
    node.scope = str_field(record, "scope").map(str::to_string);
    node.supplier = nested_str_field(record, "supplier", "name").map(str::to_string);
    node.licenses = array_field(record, "licenses")
        .iter()
        .filter_map(|choice| {
            let license = choice.get("license")?;
            str_field(license, "id").or_else(|| str_field(license, "name"))
        })
        .map(str::to_string)
        .collect();

    Some(node)
}

fn add_dependency_edges(graph: &mut ComponentGraph, record: &Value) {
    let Some(from) = str_field(record, "ref").and_then(ComponentId::new) else {
        return;
    };
    if !graph.contains(from.as_str()) {
        tracing::debug!(component = %from, "Dependency record for unknown component");
        return;
    }

    for target in array_field(record, "dependsOn") {
        let Some(to) = target.as_str().and_then(ComponentId::new) else {
            continue;
        };
        if !graph.add_edge(&from, &to) {
            tracing::debug!(from = %from, to = %to, "Dropping edge to unknown component");
        }
    }
}
