//! [`CodegenWorkflow`] (spec.md 4.G): five sequential steps that turn an
//! abstract [`Graph`] into validated Kubernetes manifests.

use crate::plan::parse_node_type;
use crate::prompts::{codegen_system_prompt, codegen_user_prompt, generator_table, prompt_for_node};
use crate::rag::build_rag_summary;
use crate::state::{CodegenState, GeneratedConfigurations, GeneratedManifest, TargetMessage};
use crate::store::GraphStore;
use async_trait::async_trait;
use forge_engine::{ExecutionContext, WorkflowSpec};
use forge_graph::{
    build_graph_edges, needed_infrastructure, validate_graph, DeltaOptions, EdgeInferenceOptions,
    Graph, GraphType, Node,
};
use forge_llm::{ChatMessage, ChatModel, ChatRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const STEPS: [&str; 5] = [
    "getOrCreateGraph",
    "getPrompt",
    "llmCall",
    "buildKubernetesGraph",
    "validateConfigurations",
];
const GENERATION_TEMPERATURE: f32 = 0.0;
const MAX_TOKENS: usize = 4000;
const RAG_TOP_K: usize = 3;
const MAX_STEP_HISTORY: usize = 10;

pub struct CodegenWorkflow {
    chat_model: Arc<dyn ChatModel>,
    store: Arc<dyn GraphStore>,
    steps: Vec<String>,
    terminal: Vec<String>,
}

impl CodegenWorkflow {
    pub fn new(chat_model: Arc<dyn ChatModel>, store: Arc<dyn GraphStore>) -> Self {
        Self {
            chat_model,
            store,
            steps: STEPS.iter().map(|s| s.to_string()).collect(),
            terminal: vec!["validateConfigurations".to_string()],
        }
    }

    async fn get_or_create_graph(&self, state: &CodegenState) -> std::result::Result<CodegenState, String> {
        let mut next = state.clone();

        let existing = match &state.graph.id {
            Some(id) => self
                .store
                .get_by_id(id, &state.company_id, &state.user_id)
                .await
                .map_err(|e| e.to_string())?,
            None => None,
        };

        next.db_graph = match existing {
            Some(graph) => Some(graph),
            None => {
                let created = self
                    .store
                    .create(state.graph.clone())
                    .await
                    .map_err(|e| e.to_string())?;
                next.graph.id = created.id.clone();
                Some(created)
            }
        };

        Ok(next)
    }

    fn get_prompt(&self, state: &CodegenState) -> CodegenState {
        let mut next = state.clone();

        let empty = empty_graph(&state.company_id, &state.user_id);
        let existing = next.db_graph.as_ref().unwrap_or(&empty);
        let needed = needed_infrastructure(&next.graph, existing, &DeltaOptions::default());

        let table = generator_table();
        next.target_messages = needed
            .iter()
            .map(|node| TargetMessage {
                node_id: node.id.clone(),
                node_type: node.node_type.as_str().to_string(),
                prompt: prompt_for_node(node, &table),
                priority: priority_for(node.node_type),
            })
            .collect();
        next.target_messages.sort_by(|a, b| b.priority.cmp(&a.priority));

        info!(
            needed = next.target_messages.len(),
            "computed needed infrastructure for codegen"
        );
        next
    }

    async fn sanitize_context(&self, state: &CodegenState) -> std::result::Result<Vec<String>, String> {
        if state.user_context.is_empty() {
            return Ok(Vec::new());
        }
        let request = ChatRequest::new(vec![
            ChatMessage::system(
                "Rewrite each of the following user-supplied notes as a short, \
                 neutral requirement. Respond with one rewritten line per input line, \
                 in order, and nothing else."
                    .to_string(),
            ),
            ChatMessage::user(state.user_context.join("\n")),
        ])
        .with_temperature(0.0);

        let response = self.chat_model.chat(request).await.map_err(|e| e.to_string())?;
        Ok(response
            .content
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    async fn llm_call(&self, state: &CodegenState) -> std::result::Result<CodegenState, String> {
        let mut next = state.clone();

        if next.sanitized_context.is_none() && !next.user_context.is_empty() {
            next.sanitized_context = Some(self.sanitize_context(&next).await?);
        }

        next.rag_summary = build_rag_summary(self.store.as_ref(), &next.company_id, &next.graph, RAG_TOP_K)
            .await
            .map_err(|e| e.to_string())?;

        let namespaces: Vec<String> = next
            .graph
            .nodes
            .iter()
            .filter_map(|n| n.namespace.clone())
            .collect();
        let system_prompt = codegen_system_prompt(
            next.rag_summary.as_deref(),
            next.sanitized_context.as_deref().unwrap_or(&next.user_context),
            &next.graph.nodes,
            &namespaces,
        );

        let target_prompts: Vec<String> = next.target_messages.iter().map(|m| m.prompt.clone()).collect();
        let requirements = if next.is_retry {
            "The previous attempt's output failed validation; produce corrected manifests."
        } else {
            "Generate the Kubernetes manifests for this deployment."
        };
        let user_prompt = codegen_user_prompt(requirements, &target_prompts);

        let request = ChatRequest::new(vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ])
        .with_temperature(GENERATION_TEMPERATURE)
        .with_max_tokens(MAX_TOKENS);

        let response = self.chat_model.chat(request).await.map_err(|e| e.to_string())?;
        let generated = parse_generated_configurations(&response.content, &next)?;
        next.generated = Some(generated);
        Ok(next)
    }

    fn build_kubernetes_graph(&self, state: &CodegenState) -> CodegenState {
        let mut next = state.clone();
        let Some(generated) = &next.generated else {
            return next;
        };

        let mut graph = Graph {
            id: None,
            name: format!("{}-kubernetes", next.graph.name),
            graph_type: GraphType::Kubernetes,
            company_id: next.company_id.clone(),
            user_id: next.user_id.clone(),
            nodes: Vec::new(),
            bridges: Vec::new(),
        };

        for (i, manifest) in generated.manifests.iter().enumerate() {
            let entity_type = manifest
                .entity_type
                .as_deref()
                .and_then(parse_node_type)
                .unwrap_or(forge_graph::NodeType::ExternalDependency);
            let id = manifest
                .entity_id
                .clone()
                .unwrap_or_else(|| format!("manifest-{i}"));
            let name = manifest
                .entity_name
                .clone()
                .unwrap_or_else(|| manifest.file_name.clone());
            let mut node = Node::new(id, name, entity_type);
            node.payload = Some(serde_json::json!({
                "fileName": manifest.file_name,
                "generatedCode": manifest.generated_code,
            }));
            graph.nodes.push(node);
        }

        build_graph_edges(&mut graph, &EdgeInferenceOptions { create_default_edges: true });
        next.kubernetes_graph = Some(graph);
        next
    }

    fn validate_configurations(&self, state: &CodegenState) -> CodegenState {
        let mut next = state.clone();
        if let Some(graph) = &next.kubernetes_graph {
            let report = validate_graph(graph);
            if report.has_errors() {
                warn!(errors = ?report.errors, "generated configurations failed validation");
            }
            next.validation = Some(report);
        }
        next
    }
}

fn empty_graph(company_id: &str, user_id: &str) -> Graph {
    Graph {
        id: None,
        name: String::new(),
        graph_type: GraphType::Abstract,
        company_id: company_id.to_string(),
        user_id: user_id.to_string(),
        nodes: Vec::new(),
        bridges: Vec::new(),
    }
}

/// Higher priority generates first when the model is given an ordered
/// worklist: externally-facing and stateful components before
/// supporting infrastructure.
fn priority_for(node_type: forge_graph::NodeType) -> u8 {
    use forge_graph::NodeType::*;
    match node_type {
        Gateway | Ingress | LoadBalancer => 10,
        Microservice | Deployment | StatefulSet => 8,
        Database | Cache | MessageQueue => 7,
        Service | Proxy => 5,
        _ => 3,
    }
}

#[derive(Debug, Deserialize)]
struct RawManifests {
    #[serde(default)]
    manifests: Vec<RawManifest>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    file_name: String,
    generated_code: String,
    #[serde(default)]
    assumptions: Vec<String>,
    #[serde(default)]
    decisions: Vec<String>,
    #[serde(default)]
    commands: Vec<String>,
    #[serde(default)]
    entity_name: Option<String>,
    #[serde(default)]
    entity_id: Option<String>,
    #[serde(default)]
    entity_type: Option<String>,
}

/// Parse the model's manifests payload, falling back to the truncated-
/// output repair procedure before giving up (spec.md 4.G.3.f).
fn parse_generated_configurations(
    content: &str,
    state: &CodegenState,
) -> std::result::Result<GeneratedConfigurations, String> {
    let stripped = crate::json_repair::strip_code_fence(content);

    // A well-formed response is a single balanced object; a truncated
    // one (the model ran out of tokens mid-manifest) never closes its
    // braces, so `extract_first_json_object` finds nothing and the
    // repair pass runs against the raw (unbalanced) text instead.
    let raw: RawManifests = match crate::json_repair::extract_first_json_object(stripped)
        .and_then(|json_str| serde_json::from_str::<RawManifests>(json_str).ok())
    {
        Some(raw) => raw,
        None => {
            let repaired = crate::json_repair::repair_truncated_manifests(stripped)
                .ok_or_else(|| "unparseable and unrepairable codegen response".to_string())?;
            warn!("repaired a truncated codegen response");
            serde_json::from_str(&repaired).map_err(|e| e.to_string())?
        }
    };

    let manifests: Vec<GeneratedManifest> = raw
        .manifests
        .into_iter()
        .map(|m| GeneratedManifest {
            file_name: m.file_name,
            generated_code: m.generated_code,
            assumptions: m.assumptions,
            decisions: m.decisions,
            commands: m.commands,
            entity_name: m.entity_name,
            entity_id: m.entity_id,
            entity_type: m.entity_type,
        })
        .collect();

    Ok(GeneratedConfigurations {
        total_files: manifests.len(),
        namespace: state.graph.nodes.iter().find_map(|n| n.namespace.clone()),
        graph_id: state.graph.id.clone(),
        original_graph_id: state.db_graph.as_ref().and_then(|g| g.id.clone()),
        manifests,
    })
}

#[async_trait]
impl WorkflowSpec<CodegenState> for CodegenWorkflow {
    fn steps(&self) -> &[String] {
        &self.steps
    }

    fn initial_step(&self) -> &str {
        "getOrCreateGraph"
    }

    fn terminal_steps(&self) -> &[String] {
        &self.terminal
    }

    fn channel_prefix(&self) -> &str {
        "codegen"
    }

    async fn handle(
        &self,
        step: &str,
        state: &CodegenState,
        ctx: &ExecutionContext,
    ) -> std::result::Result<CodegenState, String> {
        info!(thread_id = %ctx.thread_id, step, "codegen workflow step");
        match step {
            "getOrCreateGraph" => self.get_or_create_graph(state).await,
            "getPrompt" => Ok(self.get_prompt(state)),
            "llmCall" => self.llm_call(state).await,
            "buildKubernetesGraph" => Ok(self.build_kubernetes_graph(state)),
            "validateConfigurations" => Ok(self.validate_configurations(state)),
            other => Err(format!("unknown codegen step: {other}")),
        }
    }

    /// Abort on a validation error, or once the step history has grown
    /// past a sane ceiling (spec.md 4.G "Overridden shouldContinue").
    fn should_continue(&self, state: &CodegenState) -> bool {
        if state.header.step_history.len() >= MAX_STEP_HISTORY {
            return false;
        }
        match &state.validation {
            Some(report) => !report.has_errors(),
            None => true,
        }
    }

    /// In addition to recording the error message, mark the state as a
    /// retry so `llmCall` can adjust its prompt tone (spec.md 4.G
    /// "Overridden onStepError").
    fn on_step_error(&self, state: &mut CodegenState, error: &str) {
        state.header.error = Some(error.to_string());
        state.is_retry = true;
    }
}
