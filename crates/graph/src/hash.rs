//! `computeGraphHash` (spec.md 4.K): a deterministic, order-independent
//! digest of a graph's canonical form, used to key the codegen result
//! cache (`codegen:cache:<graphHash>`).

use crate::error::Result;
use crate::types::Graph;
use forge_tooling::serialization::stable_json_string;
use md5::Md5;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Md5,
}

#[derive(Debug, Clone, Copy)]
pub struct HashOptions {
    /// Include `{name, graphType, companyId, userId}` in the digest input.
    pub include_identity: bool,
    pub algorithm: HashAlgorithm,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            include_identity: true,
            algorithm: HashAlgorithm::Sha256,
        }
    }
}

/// Hash is deterministic and order-independent up to node-id and
/// edge-tuple sort order (spec.md I5).
pub fn compute_graph_hash(graph: &Graph, opts: &HashOptions) -> Result<String> {
    let mut components: Vec<String> = Vec::new();

    if opts.include_identity {
        components.push(graph.name.clone());
        components.push(graph.graph_type.as_str().to_string());
        components.push(graph.company_id.clone());
        components.push(graph.user_id.clone());
    }

    let mut nodes: Vec<&crate::types::Node> = graph.nodes.iter().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    for node in &nodes {
        let spec_json = stable_json_string(&node.spec)?;
        components.push(format!(
            "{}:{}:{}:{}",
            node.id,
            node.node_type.as_str(),
            node.name,
            spec_json
        ));
    }

    let mut edge_components: Vec<String> = Vec::new();
    for node in &nodes {
        for edge in &node.edges {
            edge_components.push(format!(
                "{}-{}-{}",
                node.id,
                edge.target,
                edge.connection_type.as_str()
            ));
        }
    }
    edge_components.sort();
    components.extend(edge_components);

    let joined = components.join("|");

    let digest = match opts.algorithm {
        HashAlgorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(joined.as_bytes());
            hex::encode(hasher.finalize())
        }
        HashAlgorithm::Md5 => {
            let mut hasher = Md5::new();
            hasher.update(joined.as_bytes());
            hex::encode(hasher.finalize())
        }
    };

    Ok(digest)
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        let mut s = String::with_capacity(bytes.as_ref().len() * 2);
        for b in bytes.as_ref() {
            let _ = write!(s, "{:02x}", b);
        }
        s
    }
}
