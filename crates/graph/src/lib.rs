//! `forge-graph` — component (K): the graph data model and its rule-table
//! utilities (hash, delta, edge inference, structural validation).

pub mod delta;
pub mod edges;
pub mod error;
pub mod hash;
pub mod types;
pub mod validate;

pub use delta::{needed_infrastructure, DeltaOptions};
pub use edges::{build_graph_edges, rule_table, EdgeInferenceOptions};
pub use error::{GraphError, Result};
pub use hash::{compute_graph_hash, HashAlgorithm, HashOptions};
pub use types::{Bridge, ConnectionRule, ConnectionType, Edge, Graph, GraphType, Node, NodeType};
pub use validate::{validate_graph, ValidationReport};
