//! `validateGraph` (spec.md 4.K): the structural validator shared by the
//! plan workflow, the codegen workflow, and the job service's
//! pre-submission check.

use crate::types::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True if any issue carries `severity=error` (the engine's
    /// `shouldContinue` treats these, not warnings, as abort signals).
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub fn validate_graph(graph: &Graph) -> ValidationReport {
    let mut errors = Vec::new();
    let warnings = Vec::new();

    if graph.name.trim().is_empty() {
        errors.push("graph.name is required".to_string());
    }
    if graph.company_id.trim().is_empty() {
        errors.push("graph.companyId is required".to_string());
    }
    if graph.user_id.trim().is_empty() {
        errors.push("graph.userId is required".to_string());
    }

    let mut seen_ids = HashSet::new();
    for node in &graph.nodes {
        if node.id.trim().is_empty() {
            errors.push("node id must not be empty".to_string());
            continue;
        }
        if !seen_ids.insert(node.id.as_str()) {
            errors.push(format!("duplicate node id: {}", node.id));
        }
    }

    for node in &graph.nodes {
        for edge in &node.edges {
            if !graph.edge_target_resolves(&edge.target) {
                errors.push(format!(
                    "edge from {} targets unresolved node {}",
                    node.id, edge.target
                ));
            }
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConnectionType, Edge, GraphType, Node, NodeType};

    fn base_graph() -> Graph {
        Graph {
            id: None,
            name: "g".into(),
            graph_type: GraphType::Kubernetes,
            company_id: "c".into(),
            user_id: "u".into(),
            nodes: Vec::new(),
            bridges: Vec::new(),
        }
    }

    #[test]
    fn empty_identity_fields_are_errors() {
        let mut g = base_graph();
        g.name = String::new();
        let report = validate_graph(&g);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("name")));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut g = base_graph();
        g.nodes.push(Node::new("a", "one", NodeType::Pod));
        g.nodes.push(Node::new("a", "two", NodeType::Pod));
        let report = validate_graph(&g);
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("duplicate")));
    }

    #[test]
    fn dangling_edge_target_is_rejected() {
        let mut g = base_graph();
        let mut node = Node::new("a", "one", NodeType::Service);
        node.edges.push(Edge {
            connection_type: ConnectionType::ServiceExposesPod,
            target: "missing".into(),
        });
        g.nodes.push(node);
        let report = validate_graph(&g);
        assert!(!report.is_valid);
    }

    #[test]
    fn valid_graph_reports_no_errors() {
        let mut g = base_graph();
        g.nodes.push(Node::new("a", "api", NodeType::Microservice));
        let report = validate_graph(&g);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }
}
