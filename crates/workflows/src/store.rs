//! [`GraphStore`] — the external graph database collaborator (spec.md
//! §1 lists it among the system's out-of-scope dependencies). Every
//! workflow step that reads or writes a persisted graph goes through
//! this trait rather than a concrete client, mirroring how
//! [`forge_kv::KvStore`] and [`forge_llm::ChatModel`] seam off their own
//! external collaborators.

use async_trait::async_trait;
use forge_graph::Graph;

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Look up a graph by id, scoped to the owning company/user.
    async fn get_by_id(
        &self,
        id: &str,
        company_id: &str,
        user_id: &str,
    ) -> crate::error::Result<Option<Graph>>;

    /// Persist a new graph, returning it with a store-assigned id.
    async fn create(&self, graph: Graph) -> crate::error::Result<Graph>;

    /// Overwrite an existing graph by id, scoped to the owning
    /// company/user. Fails with `Store` if no such graph exists.
    async fn update(&self, graph: Graph) -> crate::error::Result<Graph>;

    /// Remove a graph by id, scoped to the owning company/user. Returns
    /// whether a graph was actually removed.
    async fn delete(&self, id: &str, company_id: &str, user_id: &str) -> crate::error::Result<bool>;

    /// Graphs visible to `company_id`, most-recently-created first,
    /// bounded by `limit` — backs the MCP `query_graphs` tool.
    async fn query(&self, company_id: &str, limit: usize) -> crate::error::Result<Vec<Graph>>;

    /// Top-`limit` graphs most similar to `embedding`, scoped to
    /// `company_id`, used to build RAG context for the codegen workflow
    /// and for the MCP `get_rag_context` tool.
    async fn query_similar(
        &self,
        company_id: &str,
        embedding: &[f32],
        limit: usize,
    ) -> crate::error::Result<Vec<Graph>>;
}

/// An in-memory [`GraphStore`] for tests: a fixed catalogue of graphs
/// with a naive embedding-distance similarity query, grounding the RAG
/// context unit tests without a real graph database.
#[derive(Default)]
pub struct InMemoryGraphStore {
    graphs: std::sync::Mutex<Vec<Graph>>,
}

impl InMemoryGraphStore {
    pub fn new(graphs: Vec<Graph>) -> Self {
        Self {
            graphs: std::sync::Mutex::new(graphs),
        }
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn get_by_id(
        &self,
        id: &str,
        company_id: &str,
        user_id: &str,
    ) -> crate::error::Result<Option<Graph>> {
        let graphs = self.graphs.lock().unwrap();
        Ok(graphs
            .iter()
            .find(|g| {
                g.id.as_deref() == Some(id) && g.company_id == company_id && g.user_id == user_id
            })
            .cloned())
    }

    async fn create(&self, mut graph: Graph) -> crate::error::Result<Graph> {
        if graph.id.is_none() {
            graph.id = Some(uuid::Uuid::new_v4().to_string());
        }
        self.graphs.lock().unwrap().push(graph.clone());
        Ok(graph)
    }

    async fn update(&self, graph: Graph) -> crate::error::Result<Graph> {
        let Some(id) = graph.id.clone() else {
            return Err(crate::error::WorkflowError::Store(
                "cannot update a graph with no id".to_string(),
            ));
        };
        let mut graphs = self.graphs.lock().unwrap();
        let existing = graphs.iter_mut().find(|g| {
            g.id.as_deref() == Some(id.as_str())
                && g.company_id == graph.company_id
                && g.user_id == graph.user_id
        });
        match existing {
            Some(slot) => {
                *slot = graph.clone();
                Ok(graph)
            }
            None => Err(crate::error::WorkflowError::Store(format!(
                "no graph {id} to update"
            ))),
        }
    }

    async fn delete(&self, id: &str, company_id: &str, user_id: &str) -> crate::error::Result<bool> {
        let mut graphs = self.graphs.lock().unwrap();
        let before = graphs.len();
        graphs.retain(|g| {
            !(g.id.as_deref() == Some(id) && g.company_id == company_id && g.user_id == user_id)
        });
        Ok(graphs.len() != before)
    }

    async fn query(&self, company_id: &str, limit: usize) -> crate::error::Result<Vec<Graph>> {
        let graphs = self.graphs.lock().unwrap();
        Ok(graphs
            .iter()
            .filter(|g| g.company_id == company_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn query_similar(
        &self,
        company_id: &str,
        _embedding: &[f32],
        limit: usize,
    ) -> crate::error::Result<Vec<Graph>> {
        let graphs = self.graphs.lock().unwrap();
        Ok(graphs
            .iter()
            .filter(|g| g.company_id == company_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
