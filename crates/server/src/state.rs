//! Wires every component the binary owns into one `AppState`, the way
//! the teacher's `orchestrator-server.rs` builds its `DatabaseConnection`
//! and `BroadcastState` before handing them to `create_router`.

use crate::config::ServerConfig;
use forge_cache::{CacheConfig, WriteThroughCache};
use forge_checkpoint::Checkpointer;
use forge_engine::{EngineEvent, WorkflowEngine};
use forge_jobs::JobService;
use forge_kv::{InMemoryKvStore, KvStore};
use forge_llm::{ChatModel, OpenAiCompatibleClient, OpenAiCompatibleConfig};
use forge_mcp::ConnectionRegistry;
use forge_pubsub::PubSub;
use forge_session::{SessionCore, TokenIssuer, UserStore};
use forge_workflows::{CodegenState, CodegenWorkflow, GraphStore, InMemoryGraphStore, PlanState, PlanWorkflow};
use std::sync::Arc;

pub type PlanEngine = WorkflowEngine<PlanState, PlanWorkflow>;
pub type CodegenEngine = WorkflowEngine<CodegenState, CodegenWorkflow>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub connections: Arc<ConnectionRegistry>,
    pub session: Arc<SessionCore>,
    pub jobs: Arc<JobService>,
    pub plan_engine: Arc<PlanEngine>,
    pub codegen_engine: Arc<CodegenEngine>,
    pub graph_store: Arc<dyn GraphStore>,
}

/// Builds every component from scratch over a single in-process KV
/// store. A real deployment would point `forge-kv`, the graph store,
/// and the token issuer/user store at the external collaborators
/// spec.md §1 lists as out of scope; this binary embeds the in-memory
/// implementations those crates ship for exactly that reason — there is
/// no concrete external client in this workspace to wire in instead.
pub async fn build(
    config: ServerConfig,
    issuer: Arc<dyn TokenIssuer>,
    users: Arc<dyn UserStore>,
) -> anyhow::Result<AppState> {
    let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
    let graph_store: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::default());

    let lru_max = if config.ha_mode { 5000 } else { 1000 };
    let cache = Arc::new(WriteThroughCache::new(
        kv.clone(),
        CacheConfig {
            key_prefix: "forge".to_string(),
            lru_max,
            lru_ttl: std::time::Duration::from_secs(300),
        },
    ));

    let session = Arc::new(SessionCore::new(cache.clone(), issuer, users));

    let chat_model: Arc<dyn ChatModel> = Arc::new(OpenAiCompatibleClient::new(
        OpenAiCompatibleConfig::from_env("FORGE_LLM")?,
    ));

    let plan_checkpointer = Checkpointer::new(kv.clone(), "plan");
    let plan_events: PubSub<EngineEvent> = PubSub::new();
    let plan_engine = Arc::new(WorkflowEngine::new(
        plan_checkpointer,
        plan_events,
        Arc::new(PlanWorkflow::new(chat_model.clone())),
    ));

    let codegen_checkpointer = Checkpointer::new(kv.clone(), "codegen");
    let codegen_events: PubSub<EngineEvent> = PubSub::new();
    let codegen_engine = Arc::new(WorkflowEngine::new(
        codegen_checkpointer,
        codegen_events,
        Arc::new(CodegenWorkflow::new(chat_model, graph_store.clone())),
    ));

    let jobs = Arc::new(JobService::new(cache, PubSub::new(), codegen_engine.clone()));

    Ok(AppState {
        config: Arc::new(config),
        connections: Arc::new(ConnectionRegistry::new()),
        session,
        jobs,
        plan_engine,
        codegen_engine,
        graph_store,
    })
}

#[cfg(test)]
pub fn test_state(config: ServerConfig) -> AppState {
    use forge_llm::FakeChatModel;
    use forge_session::{FakeTokenIssuer, InMemoryUserStore};

    let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
    let graph_store: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::default());
    let cache = Arc::new(WriteThroughCache::new(
        kv.clone(),
        CacheConfig {
            key_prefix: "forge-server-test".to_string(),
            lru_max: 100,
            lru_ttl: std::time::Duration::from_secs(60),
        },
    ));
    let session = Arc::new(SessionCore::new(
        cache.clone(),
        Arc::new(FakeTokenIssuer::default()),
        Arc::new(InMemoryUserStore::default()),
    ));
    let chat_model: Arc<dyn ChatModel> = Arc::new(FakeChatModel::new(vec!["{}".to_string()]));

    let plan_engine = Arc::new(WorkflowEngine::new(
        Checkpointer::new(kv.clone(), "plan-test"),
        PubSub::new(),
        Arc::new(PlanWorkflow::new(chat_model.clone())),
    ));
    let codegen_engine = Arc::new(WorkflowEngine::new(
        Checkpointer::new(kv, "codegen-test"),
        PubSub::new(),
        Arc::new(CodegenWorkflow::new(chat_model, graph_store.clone())),
    ));
    let jobs = Arc::new(JobService::new(cache, PubSub::new(), codegen_engine.clone()));

    AppState {
        config: Arc::new(config),
        connections: Arc::new(ConnectionRegistry::new()),
        session,
        jobs,
        plan_engine,
        codegen_engine,
        graph_store,
    }
}
