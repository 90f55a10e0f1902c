//! `getNeededInfrastructure` (spec.md 4.K): the delta between a desired
//! graph and what already exists, used by the codegen workflow's
//! `getPrompt` step to compute which nodes still need manifests.

use crate::types::{Graph, Node, NodeType};
use forge_tooling::serialization::stable_json_string;

#[derive(Debug, Clone, Default)]
pub struct DeltaOptions {
    pub type_whitelist: Option<Vec<NodeType>>,
    pub min_edge_count: Option<usize>,
    pub exclude_externals: bool,
}

fn node_differs(desired: &Node, existing: &Node) -> bool {
    if desired.name != existing.name || desired.node_type != existing.node_type {
        return true;
    }
    match (stable_json_string(&desired.spec), stable_json_string(&existing.spec)) {
        (Ok(d), Ok(e)) => d != e,
        _ => desired.spec != existing.spec,
    }
}

/// For each node in `desired`, include it if it's absent from `existing`
/// or differs in name, type, or serialized spec, then apply the
/// caller's filters.
pub fn needed_infrastructure<'a>(
    desired: &'a Graph,
    existing: &Graph,
    opts: &DeltaOptions,
) -> Vec<&'a Node> {
    desired
        .nodes
        .iter()
        .filter(|node| match existing.node(&node.id) {
            None => true,
            Some(existing_node) => node_differs(node, existing_node),
        })
        .filter(|node| {
            opts.type_whitelist
                .as_ref()
                .map_or(true, |allowed| allowed.contains(&node.node_type))
        })
        .filter(|node| {
            opts.min_edge_count
                .map_or(true, |min| node.edges.len() >= min)
        })
        .filter(|node| !(opts.exclude_externals && node.node_type.is_external()))
        .collect()
}
