//! [`PlanWorkflow`] (spec.md 4.F): four sequential steps that turn a
//! user's freeform request into a validated [`Graph`].

use crate::json_repair::{extract_first_json_object, strip_code_fence};
use crate::prompts::plan_system_prompt;
use crate::state::PlanState;
use async_trait::async_trait;
use chrono::Utc;
use forge_engine::{ExecutionContext, WorkflowSpec};
use forge_graph::{validate_graph, Graph, GraphType, Node, NodeType};
use forge_llm::{ChatMessage, ChatModel, ChatRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const STEPS: [&str; 4] = ["analyzeRequest", "generateGraph", "validateGraph", "saveGraph"];
const GENERATION_TEMPERATURE: f32 = 0.1;

pub struct PlanWorkflow {
    chat_model: Arc<dyn ChatModel>,
    steps: Vec<String>,
    terminal: Vec<String>,
}

impl PlanWorkflow {
    pub fn new(chat_model: Arc<dyn ChatModel>) -> Self {
        Self {
            chat_model,
            steps: STEPS.iter().map(|s| s.to_string()).collect(),
            terminal: vec!["saveGraph".to_string()],
        }
    }

    fn analyze_request(&self, state: &PlanState) -> PlanState {
        let mut next = state.clone();
        next.messages.push(ChatMessage::user(state.request.clone()));
        next.plan_context = state.request.clone();
        next
    }

    async fn generate_graph(&self, state: &PlanState) -> std::result::Result<PlanState, String> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(plan_system_prompt()),
            ChatMessage::user(state.plan_context.clone()),
        ])
        .with_temperature(GENERATION_TEMPERATURE);

        let response = self
            .chat_model
            .chat(request)
            .await
            .map_err(|e| e.to_string())?;

        let stripped = strip_code_fence(&response.content);
        let json_str = extract_first_json_object(stripped)
            .ok_or_else(|| "no JSON object found in plan response".to_string())?;

        let plan: RawPlan = serde_json::from_str(json_str).map_err(|e| e.to_string())?;

        let mut graph = Graph {
            id: None,
            name: plan.name,
            graph_type: GraphType::Microservice,
            company_id: state.company_id.clone(),
            user_id: state.user_id.clone(),
            nodes: Vec::new(),
            bridges: Vec::new(),
        };

        let now = Utc::now().to_rfc3339();
        for (i, raw_node) in plan.nodes.into_iter().enumerate() {
            let node_type = parse_node_type(&raw_node.node_type)
                .ok_or_else(|| format!("unknown nodeType: {}", raw_node.node_type))?;
            let id = raw_node.id.unwrap_or_else(|| format!("node-{i}"));
            let mut node = Node::new(id, raw_node.name, node_type);
            let mut spec = raw_node.spec.unwrap_or_else(|| serde_json::json!({}));
            if let Some(obj) = spec.as_object_mut() {
                obj.insert("createdAt".to_string(), serde_json::Value::String(now.clone()));
            }
            node.spec = spec;
            graph.nodes.push(node);
        }

        let mut next = state.clone();
        next.graph = Some(graph);
        Ok(next)
    }

    fn validate(&self, state: &PlanState) -> PlanState {
        let mut next = state.clone();
        if let Some(graph) = &next.graph {
            let report = validate_graph(graph);
            if report.has_errors() {
                warn!(errors = ?report.errors, "generated graph failed structural validation");
            }
            next.validation = Some(report);
        }
        next
    }
}

#[derive(Debug, Deserialize)]
struct RawPlan {
    name: String,
    #[serde(default)]
    #[allow(dead_code)]
    description: Option<String>,
    #[serde(default)]
    nodes: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(rename = "nodeType")]
    node_type: String,
    #[serde(default)]
    spec: Option<serde_json::Value>,
}

pub(crate) fn parse_node_type(raw: &str) -> Option<NodeType> {
    match raw.to_uppercase().as_str() {
        "POD" => Some(NodeType::Pod),
        "SERVICE" => Some(NodeType::Service),
        "DEPLOYMENT" => Some(NodeType::Deployment),
        "STATEFUL_SET" | "STATEFULSET" => Some(NodeType::StatefulSet),
        "DAEMON_SET" | "DAEMONSET" => Some(NodeType::DaemonSet),
        "REPLICA_SET" | "REPLICASET" => Some(NodeType::ReplicaSet),
        "JOB" => Some(NodeType::Job),
        "CRON_JOB" | "CRONJOB" => Some(NodeType::CronJob),
        "CONFIG_MAP" | "CONFIGMAP" => Some(NodeType::ConfigMap),
        "SECRET" => Some(NodeType::Secret),
        "INGRESS" => Some(NodeType::Ingress),
        "PERSISTENT_VOLUME_CLAIM" | "PVC" => Some(NodeType::PersistentVolumeClaim),
        "NAMESPACE" => Some(NodeType::Namespace),
        "SERVICE_ACCOUNT" => Some(NodeType::ServiceAccount),
        "NETWORK_POLICY" => Some(NodeType::NetworkPolicy),
        "HORIZONTAL_POD_AUTOSCALER" | "HPA" => Some(NodeType::HorizontalPodAutoscaler),
        "MICROSERVICE" => Some(NodeType::Microservice),
        "DATABASE" => Some(NodeType::Database),
        "CACHE" => Some(NodeType::Cache),
        "MESSAGE_QUEUE" => Some(NodeType::MessageQueue),
        "PROXY" => Some(NodeType::Proxy),
        "LOAD_BALANCER" => Some(NodeType::LoadBalancer),
        "MONITORING" => Some(NodeType::Monitoring),
        "GATEWAY" => Some(NodeType::Gateway),
        "EXTERNAL_DEPENDENCY" => Some(NodeType::ExternalDependency),
        _ => None,
    }
}

#[async_trait]
impl WorkflowSpec<PlanState> for PlanWorkflow {
    fn steps(&self) -> &[String] {
        &self.steps
    }

    fn initial_step(&self) -> &str {
        "analyzeRequest"
    }

    fn terminal_steps(&self) -> &[String] {
        &self.terminal
    }

    fn channel_prefix(&self) -> &str {
        "plan"
    }

    async fn handle(
        &self,
        step: &str,
        state: &PlanState,
        ctx: &ExecutionContext,
    ) -> std::result::Result<PlanState, String> {
        info!(thread_id = %ctx.thread_id, step, "plan workflow step");
        match step {
            "analyzeRequest" => Ok(self.analyze_request(state)),
            "generateGraph" => self.generate_graph(state).await,
            "validateGraph" => Ok(self.validate(state)),
            "saveGraph" => Ok(state.clone()),
            other => Err(format!("unknown plan step: {other}")),
        }
    }

    /// Any validation error of severity `error` aborts the workflow
    /// (spec.md 4.F.3).
    fn should_continue(&self, state: &PlanState) -> bool {
        match &state.validation {
            Some(report) => !report.has_errors(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_engine::WorkflowEngine;
    use forge_checkpoint::Checkpointer;
    use forge_kv::InMemoryKvStore;
    use forge_llm::FakeChatModel;
    use forge_pubsub::PubSub;

    fn engine(chat_model: Arc<dyn ChatModel>) -> WorkflowEngine<PlanState, PlanWorkflow> {
        let kv: Arc<dyn forge_kv::KvStore> = Arc::new(InMemoryKvStore::new());
        let checkpointer = Checkpointer::new(kv, "plan-test");
        let events: PubSub<forge_engine::EngineEvent> = PubSub::new();
        WorkflowEngine::new(checkpointer, events, Arc::new(PlanWorkflow::new(chat_model)))
    }

    #[tokio::test]
    async fn generates_validates_and_saves_a_graph() {
        let response = r#"{"name": "shop", "nodes": [{"id": "api", "name": "api", "nodeType": "MICROSERVICE"}]}"#;
        let chat_model: Arc<dyn ChatModel> = Arc::new(FakeChatModel::new(vec![response.to_string()]));
        let eng = engine(chat_model);
        let ctx = ExecutionContext::new("plan-thread");

        let state = PlanState::new("stand up a shop", "company-1", "user-1");
        let final_state = eng.execute(state, &ctx).await.unwrap();

        let graph = final_state.graph.expect("graph should be generated");
        assert_eq!(graph.name, "shop");
        assert_eq!(graph.nodes.len(), 1);
        let validation = final_state.validation.expect("validation should have run");
        assert!(validation.is_valid);
    }

    #[tokio::test]
    async fn unknown_node_type_fails_the_generate_step() {
        let response = r#"{"name": "shop", "nodes": [{"name": "api", "nodeType": "NOT_A_REAL_TYPE"}]}"#;
        let chat_model: Arc<dyn ChatModel> = Arc::new(FakeChatModel::new(vec![response.to_string()]));
        let eng = engine(chat_model);
        let ctx = ExecutionContext::new("plan-thread-bad");

        let state = PlanState::new("stand up a shop", "company-1", "user-1");
        let final_state = eng.execute(state, &ctx).await.unwrap();

        assert_eq!(
            final_state.header.status,
            forge_checkpoint::WorkflowStatus::Failed
        );
    }

    #[test]
    fn parses_known_node_types_case_insensitively() {
        assert_eq!(parse_node_type("microservice"), Some(NodeType::Microservice));
        assert_eq!(parse_node_type("STATEFULSET"), Some(NodeType::StatefulSet));
        assert_eq!(parse_node_type("not-a-type"), None);
    }
}
