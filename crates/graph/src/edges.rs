//! `buildGraphEdges` (spec.md 4.K): rule-table inference plus an
//! optional base-name grouping pass for default Service→Deployment→Pod
//! wiring.

use crate::types::{ConnectionRule, ConnectionType, Graph, NodeType};

/// The fixed connection-inference rule table.
pub fn rule_table() -> Vec<ConnectionRule> {
    vec![
        ConnectionRule {
            source_type: NodeType::Service,
            target_type: NodeType::Deployment,
            connection_type: ConnectionType::ServiceExposesPod,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Service,
            target_type: NodeType::Pod,
            connection_type: ConnectionType::ServiceExposesPod,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Deployment,
            target_type: NodeType::Pod,
            connection_type: ConnectionType::DeploymentManagesPod,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::StatefulSet,
            target_type: NodeType::Pod,
            connection_type: ConnectionType::StatefulsetManagesPod,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::DaemonSet,
            target_type: NodeType::Pod,
            connection_type: ConnectionType::DaemonsetManagesPod,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Ingress,
            target_type: NodeType::Service,
            connection_type: ConnectionType::IngressRoutesToService,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::CronJob,
            target_type: NodeType::Job,
            connection_type: ConnectionType::CronjobCreatesJob,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Job,
            target_type: NodeType::Pod,
            connection_type: ConnectionType::JobCreatesPod,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Deployment,
            target_type: NodeType::ConfigMap,
            connection_type: ConnectionType::DeploymentUsesConfigmap,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Deployment,
            target_type: NodeType::Secret,
            connection_type: ConnectionType::DeploymentUsesSecret,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Deployment,
            target_type: NodeType::PersistentVolumeClaim,
            connection_type: ConnectionType::DeploymentMountsPvc,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Microservice,
            target_type: NodeType::Database,
            connection_type: ConnectionType::DatabaseUsedBy,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Microservice,
            target_type: NodeType::Cache,
            connection_type: ConnectionType::CacheUsedBy,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Gateway,
            target_type: NodeType::Microservice,
            connection_type: ConnectionType::GatewayRoutesTo,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::LoadBalancer,
            target_type: NodeType::Service,
            connection_type: ConnectionType::LoadbalancerExposesService,
            bidirectional: false,
        },
        ConnectionRule {
            source_type: NodeType::Monitoring,
            target_type: NodeType::Deployment,
            connection_type: ConnectionType::MonitoringScrapes,
            bidirectional: false,
        },
    ]
}

const SERVICE_SUFFIXES: &[&str] = &["-service", "-svc"];
const DEPLOYMENT_SUFFIXES: &[&str] = &["-deployment", "-deploy"];
const POD_SUFFIXES: &[&str] = &["-pod", "-pods"];
const OTHER_SUFFIXES: &[&str] = &["-ingress", "-configmap", "-secret"];

/// Strip a recognized suffix, returning the base name used to group
/// related resources for default edge wiring.
fn base_name(name: &str) -> &str {
    for suffix in SERVICE_SUFFIXES
        .iter()
        .chain(DEPLOYMENT_SUFFIXES)
        .chain(POD_SUFFIXES)
        .chain(OTHER_SUFFIXES)
    {
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped;
        }
    }
    name
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeInferenceOptions {
    pub create_default_edges: bool,
}

/// Infer edges between a graph's nodes: drop dangling edges, apply the
/// rule table, then (optionally) wire Service→Deployment→Pod within
/// base-name groups. Idempotent: running twice yields the same edge set.
pub fn build_graph_edges(graph: &mut Graph, opts: &EdgeInferenceOptions) {
    drop_dangling_edges(graph);
    apply_rule_table(graph);
    if opts.create_default_edges {
        apply_default_edges(graph);
    }
}

fn drop_dangling_edges(graph: &mut Graph) {
    let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
    let bridge_ids: Vec<String> = graph
        .bridges
        .iter()
        .flat_map(|b| b.node_ids.iter().cloned())
        .collect();
    for node in &mut graph.nodes {
        node.edges
            .retain(|e| ids.contains(&e.target) || bridge_ids.contains(&e.target));
    }
}

fn apply_rule_table(graph: &mut Graph) {
    let rules = rule_table();
    for rule in &rules {
        let sources: Vec<String> = graph
            .nodes
            .iter()
            .filter(|n| n.node_type == rule.source_type)
            .map(|n| n.id.clone())
            .collect();
        let targets: Vec<String> = graph
            .nodes
            .iter()
            .filter(|n| n.node_type == rule.target_type)
            .map(|n| n.id.clone())
            .collect();

        for source_id in &sources {
            for target_id in &targets {
                if source_id == target_id {
                    continue;
                }
                link(graph, source_id, target_id, rule.connection_type);
                if rule.bidirectional {
                    link(graph, target_id, source_id, rule.connection_type);
                }
            }
        }
    }
}

fn link(graph: &mut Graph, source_id: &str, target_id: &str, connection_type: ConnectionType) {
    if let Some(source) = graph.node_mut(source_id) {
        if !source.has_edge(connection_type, target_id) {
            source.edges.push(crate::types::Edge {
                connection_type,
                target: target_id.to_string(),
            });
        }
    }
}

fn apply_default_edges(graph: &mut Graph) {
    use std::collections::HashMap;

    let mut groups: HashMap<String, Vec<(String, NodeType)>> = HashMap::new();
    for node in &graph.nodes {
        groups
            .entry(base_name(&node.name).to_string())
            .or_default()
            .push((node.id.clone(), node.node_type));
    }

    for members in groups.values() {
        let services: Vec<&String> = members
            .iter()
            .filter(|(_, t)| *t == NodeType::Service)
            .map(|(id, _)| id)
            .collect();
        let deployments: Vec<&String> = members
            .iter()
            .filter(|(_, t)| *t == NodeType::Deployment)
            .map(|(id, _)| id)
            .collect();
        let pods: Vec<&String> = members
            .iter()
            .filter(|(_, t)| *t == NodeType::Pod)
            .map(|(id, _)| id)
            .collect();

        for s in &services {
            for d in &deployments {
                link(graph, s, d, ConnectionType::ServiceExposesPod);
            }
        }
        for d in &deployments {
            for p in &pods {
                link(graph, d, p, ConnectionType::DeploymentManagesPod);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GraphType, Node};

    fn test_graph() -> Graph {
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
    fn service_to_deployment_rule_produces_single_edge() {
        let mut graph = test_graph();
        graph.nodes.push(Node::new("s", "api-service", NodeType::Service));
        graph.nodes.push(Node::new("d", "api-deployment", NodeType::Deployment));

        build_graph_edges(&mut graph, &EdgeInferenceOptions::default());

        let source = graph.node("s").unwrap();
        assert_eq!(source.edges.len(), 1);
        assert_eq!(source.edges[0].target, "d");
        assert_eq!(source.edges[0].connection_type, ConnectionType::ServiceExposesPod);
        assert!(graph.node("d").unwrap().edges.is_empty());
    }

    #[test]
    fn dangling_edge_is_dropped() {
        let mut graph = test_graph();
        let mut n = Node::new("a", "a", NodeType::Pod);
        n.edges.push(crate::types::Edge {
            connection_type: ConnectionType::Manages,
            target: "missing".into(),
        });
        graph.nodes.push(n);

        build_graph_edges(&mut graph, &EdgeInferenceOptions::default());
        assert!(graph.node("a").unwrap().edges.is_empty());
    }

    #[test]
    fn inference_is_idempotent() {
        let mut graph = test_graph();
        graph.nodes.push(Node::new("s", "api-service", NodeType::Service));
        graph.nodes.push(Node::new("d", "api-deployment", NodeType::Deployment));
        graph.nodes.push(Node::new("p", "api-pod", NodeType::Pod));

        let opts = EdgeInferenceOptions {
            create_default_edges: true,
        };
        build_graph_edges(&mut graph, &opts);
        let first: Vec<_> = graph.nodes.iter().map(|n| n.edges.clone()).collect();

        build_graph_edges(&mut graph, &opts);
        let second: Vec<_> = graph.nodes.iter().map(|n| n.edges.clone()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn default_edges_wire_within_base_name_group() {
        let mut graph = test_graph();
        graph.nodes.push(Node::new("s", "checkout-service", NodeType::Service));
        graph.nodes.push(Node::new("d", "checkout-deployment", NodeType::Deployment));
        graph.nodes.push(Node::new("p", "checkout-pod", NodeType::Pod));
        graph.nodes.push(Node::new("other", "billing-deployment", NodeType::Deployment));

        build_graph_edges(
            &mut graph,
            &EdgeInferenceOptions {
                create_default_edges: true,
            },
        );

        let deployment = graph.node("d").unwrap();
        assert!(deployment.has_edge(ConnectionType::DeploymentManagesPod, "p"));
        let service = graph.node("s").unwrap();
        assert!(!service.has_edge(ConnectionType::ServiceExposesPod, "other"));
    }
}
