//! Concrete [`forge_checkpoint::HasHeader`] state types for the plan
//! and codegen workflows (spec.md §3 "WorkflowState").

use forge_checkpoint::{HasHeader, WorkflowHeader};
use forge_graph::{Graph, ValidationReport};
use forge_llm::ChatMessage;
use serde::{Deserialize, Serialize};

/// One per-node generation request queued for the LLM call (spec.md
/// 4.G.2: `TargetMessage`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMessage {
    pub node_id: String,
    pub node_type: String,
    pub prompt: String,
    pub priority: u8,
}

/// One generated manifest (spec.md 4.G.3.g).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedManifest {
    pub file_name: String,
    pub generated_code: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub decisions: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
}

/// `{totalFiles, namespace, graphId, originalGraphId, nodes[]}` (spec.md
/// 4.G.3.g).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneratedConfigurations {
    pub total_files: usize,
    pub namespace: Option<String>,
    pub graph_id: Option<String>,
    pub original_graph_id: Option<String>,
    pub manifests: Vec<GeneratedManifest>,
}

/// State carried through [`crate::plan::PlanWorkflow`]'s four steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanState {
    pub header: WorkflowHeader,
    pub company_id: String,
    pub user_id: String,
    pub request: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub plan_context: String,
    #[serde(default)]
    pub graph: Option<Graph>,
    #[serde(default)]
    pub validation: Option<ValidationReport>,
}

impl PlanState {
    pub fn new(request: impl Into<String>, company_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            header: WorkflowHeader::new("analyzeRequest", 2),
            company_id: company_id.into(),
            user_id: user_id.into(),
            request: request.into(),
            messages: Vec::new(),
            plan_context: String::new(),
            graph: None,
            validation: None,
        }
    }
}

impl HasHeader for PlanState {
    fn header(&self) -> &WorkflowHeader {
        &self.header
    }
    fn header_mut(&mut self) -> &mut WorkflowHeader {
        &mut self.header
    }
}

/// State carried through [`crate::codegen::CodegenWorkflow`]'s five
/// steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenState {
    pub header: WorkflowHeader,
    pub company_id: String,
    pub user_id: String,
    /// The abstract graph to generate manifests for. Carries an `id` if
    /// it already exists in the graph store.
    pub graph: Graph,
    #[serde(default)]
    pub db_graph: Option<Graph>,
    #[serde(default)]
    pub target_messages: Vec<TargetMessage>,
    #[serde(default)]
    pub user_context: Vec<String>,
    #[serde(default)]
    pub sanitized_context: Option<Vec<String>>,
    #[serde(default)]
    pub rag_summary: Option<String>,
    #[serde(default)]
    pub generated: Option<GeneratedConfigurations>,
    #[serde(default)]
    pub kubernetes_graph: Option<Graph>,
    #[serde(default)]
    pub validation: Option<ValidationReport>,
    /// Set by `onStepError`; read by the prompt builder to adjust tone
    /// on a retried step (spec.md 4.G "Overridden onStepError").
    #[serde(default)]
    pub is_retry: bool,
}

impl CodegenState {
    pub fn new(graph: Graph, company_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            header: WorkflowHeader::new("getOrCreateGraph", 2),
            company_id: company_id.into(),
            user_id: user_id.into(),
            graph,
            db_graph: None,
            target_messages: Vec::new(),
            user_context: Vec::new(),
            sanitized_context: None,
            rag_summary: None,
            generated: None,
            kubernetes_graph: None,
            validation: None,
            is_retry: false,
        }
    }
}

impl HasHeader for CodegenState {
    fn header(&self) -> &WorkflowHeader {
        &self.header
    }
    fn header_mut(&mut self) -> &mut WorkflowHeader {
        &mut self.header
    }
}
