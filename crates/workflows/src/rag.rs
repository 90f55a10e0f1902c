//! RAG context building (spec.md 4.G.3.b): "a textual summary of similar
//! past graphs, injected into the LLM system prompt" (GLOSSARY).
//!
//! Embeddings are not part of the closed `Node`/`Graph` data model
//! (spec.md §3), so this reads them from each node's free-form `spec`
//! bag under a `"embedding"` key (and a graph-wide override under
//! `"context_embedding"` on the graph's first node, approximating
//! spec.md's `graph.contextEmbedding`) — a deliberate simplification
//! over a dedicated embedding field, documented in the design ledger.

use crate::store::GraphStore;
use forge_graph::{Graph, Node};

fn node_embedding(node: &Node) -> Option<Vec<f32>> {
    node.spec
        .get("embedding")?
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}

/// `graph.contextEmbedding` if present (approximated as the first node's
/// `"context_embedding"` spec field); else the average of all node
/// embeddings; else `None` (RAG lookup is skipped).
pub fn graph_embedding(graph: &Graph) -> Option<Vec<f32>> {
    if let Some(first) = graph.nodes.first() {
        if let Some(arr) = first.spec.get("context_embedding").and_then(|v| v.as_array()) {
            let embedding: Option<Vec<f32>> =
                arr.iter().map(|v| v.as_f64().map(|f| f as f32)).collect();
            if embedding.is_some() {
                return embedding;
            }
        }
    }

    let embeddings: Vec<Vec<f32>> = graph.nodes.iter().filter_map(node_embedding).collect();
    if embeddings.is_empty() {
        return None;
    }
    let dim = embeddings[0].len();
    let mut sum = vec![0f32; dim];
    let mut count = 0usize;
    for e in &embeddings {
        if e.len() != dim {
            continue;
        }
        for (i, v) in e.iter().enumerate() {
            sum[i] += v;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(sum.into_iter().map(|v| v / count as f32).collect())
}

/// Query the store for similar graphs and render a textual summary:
/// `### Example i: ...` enumerating each graph's node-type histogram.
pub async fn build_rag_summary(
    store: &dyn GraphStore,
    company_id: &str,
    graph: &Graph,
    top_k: usize,
) -> crate::error::Result<Option<String>> {
    let Some(embedding) = graph_embedding(graph) else {
        return Ok(None);
    };

    let similar = store.query_similar(company_id, &embedding, top_k).await?;
    if similar.is_empty() {
        return Ok(None);
    }

    let mut summary = String::new();
    for (i, example) in similar.iter().enumerate() {
        summary.push_str(&format!(
            "### Example {}: {} ({} nodes)\n",
            i + 1,
            example.name,
            example.nodes.len()
        ));
        summary.push_str(&crate::prompts::node_type_histogram(&example.nodes));
        summary.push_str("\n\n");
    }
    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryGraphStore;
    use forge_graph::{GraphType, NodeType};

    fn graph_with_embedding(embedding: Vec<f32>) -> Graph {
        let mut node = Node::new("a", "api", NodeType::Microservice);
        node.spec = serde_json::json!({ "embedding": embedding });
        Graph {
            id: None,
            name: "g".into(),
            graph_type: GraphType::Microservice,
            company_id: "c".into(),
            user_id: "u".into(),
            nodes: vec![node],
            bridges: Vec::new(),
        }
    }

    #[test]
    fn averages_node_embeddings_when_no_context_embedding() {
        let mut g = graph_with_embedding(vec![1.0, 1.0]);
        let mut second = Node::new("b", "db", NodeType::Database);
        second.spec = serde_json::json!({ "embedding": [3.0, 3.0] });
        g.nodes.push(second);

        let avg = graph_embedding(&g).unwrap();
        assert_eq!(avg, vec![2.0, 2.0]);
    }

    #[test]
    fn no_embeddings_yields_none() {
        let g = Graph {
            id: None,
            name: "g".into(),
            graph_type: GraphType::Microservice,
            company_id: "c".into(),
            user_id: "u".into(),
            nodes: vec![Node::new("a", "a", NodeType::Microservice)],
            bridges: Vec::new(),
        };
        assert!(graph_embedding(&g).is_none());
    }

    #[tokio::test]
    async fn builds_summary_from_similar_graphs() {
        let mut example = graph_with_embedding(vec![1.0, 1.0]);
        example.company_id = "c".into();
        let store = InMemoryGraphStore::new(vec![example]);
        let query_graph = graph_with_embedding(vec![1.0, 1.0]);

        let summary = build_rag_summary(&store, "c", &query_graph, 3).await.unwrap();
        assert!(summary.unwrap().contains("### Example 1"));
    }

    #[tokio::test]
    async fn skips_lookup_when_no_embedding() {
        let store = InMemoryGraphStore::new(vec![]);
        let g = Graph {
            id: None,
            name: "g".into(),
            graph_type: GraphType::Microservice,
            company_id: "c".into(),
            user_id: "u".into(),
            nodes: vec![Node::new("a", "a", NodeType::Microservice)],
            bridges: Vec::new(),
        };
        let summary = build_rag_summary(&store, "c", &g, 3).await.unwrap();
        assert!(summary.is_none());
    }
}
