//! The fixed tool catalogue (spec.md 4.I "Tool registry"): sixteen
//! tools across codegen, planning, and graph-store operations. Each
//! entry is a thin adapter around (H) (`forge_jobs::JobService`), the
//! plan engine, or the graph store — grounded on the teacher's
//! `orchestrator::api::handlers::*` modules, which are likewise thin
//! per-resource adapters around a shared service layer.

use crate::error::{McpError, Result};
use forge_engine::{ExecutionContext, WorkflowEngine};
use forge_graph::{validate_graph, Graph};
use forge_jobs::{JobOptions, JobService};
use forge_workflows::{GraphStore, PlanState, PlanWorkflow};
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Everything a tool handler needs, cheap to clone (all fields are
/// `Arc`s) so each `tools/call` dispatch can hand out its own copy.
#[derive(Clone)]
pub struct ToolContext {
    pub jobs: Arc<JobService>,
    pub plan_engine: Arc<WorkflowEngine<PlanState, PlanWorkflow>>,
    pub graph_store: Arc<dyn GraphStore>,
}

type ToolFuture = Pin<Box<dyn Future<Output = Result<Value>> + Send>>;
type ToolHandler = fn(Value, ToolContext) -> ToolFuture;

pub struct Tool {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub handler: ToolHandler,
}

fn arg<T: serde::de::DeserializeOwned>(args: &Value, field: &str) -> Result<T> {
    args.get(field)
        .cloned()
        .ok_or_else(|| McpError::Other(format!("missing required argument: {field}")))
        .and_then(|v| serde_json::from_value(v).map_err(|e| McpError::Other(e.to_string())))
}

fn opt_arg<T: serde::de::DeserializeOwned>(args: &Value, field: &str) -> Option<T> {
    args.get(field).cloned().and_then(|v| serde_json::from_value(v).ok())
}

// ---- codegen tools ----

fn generate_code(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let graph: Graph = arg(&args, "graph")?;
        let options: JobOptions = opt_arg(&args, "options").unwrap_or_default();
        let user_context: Vec<String> = opt_arg(&args, "userContext").unwrap_or_default();
        let submission = ctx.jobs.submit_job(graph, options, user_context).await?;
        Ok(serde_json::to_value(submission).unwrap())
    })
}

fn get_codegen_status(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let job_id: String = arg(&args, "jobId")?;
        let status = ctx.jobs.get_job_status(&job_id).await?;
        Ok(serde_json::to_value(status).unwrap())
    })
}

fn cancel_codegen(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let job_id: String = arg(&args, "jobId")?;
        let cancelled = ctx.jobs.cancel_job(&job_id).await?;
        Ok(json!({ "cancelled": cancelled }))
    })
}

fn validate_graph_tool(args: Value, _ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let graph: Graph = arg(&args, "graph")?;
        let report = validate_graph(&graph);
        Ok(serde_json::to_value(report).unwrap())
    })
}

fn get_manifests(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let job_id: String = arg(&args, "jobId")?;
        let timeout_ms: u64 = opt_arg(&args, "timeoutMs").unwrap_or(5 * 60 * 1000);
        let result = ctx
            .jobs
            .get_generated_code(&job_id, Duration::from_millis(timeout_ms))
            .await?;
        Ok(serde_json::to_value(result).unwrap())
    })
}

// ---- planning tools ----

fn create_plan(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let request: String = arg(&args, "request")?;
        let company_id: String = arg(&args, "companyId")?;
        let user_id: String = arg(&args, "userId")?;

        let thread_id = Uuid::new_v4().to_string();
        let state = PlanState::new(request, company_id, user_id);
        let exec_ctx = ExecutionContext::new(thread_id.clone());
        let final_state = ctx
            .plan_engine
            .execute(state, &exec_ctx)
            .await
            .map_err(|e| McpError::Other(e.to_string()))?;

        Ok(json!({
            "threadId": thread_id,
            "status": final_state.header.status,
            "graph": final_state.graph,
            "validation": final_state.validation,
        }))
    })
}

fn get_plan_status(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let thread_id: String = arg(&args, "threadId")?;
        let header = ctx
            .plan_engine
            .get_status(&thread_id)
            .await
            .map_err(|e| McpError::Other(e.to_string()))?;
        Ok(serde_json::to_value(header).unwrap())
    })
}

fn cancel_plan(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let thread_id: String = arg(&args, "threadId")?;
        let cancelled = ctx
            .plan_engine
            .cancel(&thread_id)
            .await
            .map_err(|e| McpError::Other(e.to_string()))?;
        Ok(json!({ "cancelled": cancelled }))
    })
}

/// A lightweight preview of what `create_plan` will feed the LLM,
/// without actually invoking it: the request becomes both the sole
/// chat turn and the plan context (mirrors `PlanWorkflow`'s
/// `analyzeRequest` step, which is itself a pure transform with no
/// I/O).
fn analyze_request(args: Value, _ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let request: String = arg(&args, "request")?;
        Ok(json!({ "planContext": request, "messageCount": 1 }))
    })
}

fn get_plan_graph(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let thread_id: String = arg(&args, "threadId")?;
        let state = ctx
            .plan_engine
            .get_state(&thread_id)
            .await
            .map_err(|e| McpError::Other(e.to_string()))?;
        Ok(match state {
            Some(s) => serde_json::to_value(s.graph).unwrap(),
            None => Value::Null,
        })
    })
}

// ---- graph store tools ----

fn query_graphs(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let company_id: String = arg(&args, "companyId")?;
        let limit: usize = opt_arg(&args, "limit").unwrap_or(20);
        let graphs = ctx.graph_store.query(&company_id, limit).await?;
        Ok(serde_json::to_value(graphs).unwrap())
    })
}

fn get_graph(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let id: String = arg(&args, "id")?;
        let company_id: String = arg(&args, "companyId")?;
        let user_id: String = arg(&args, "userId")?;
        let graph = ctx.graph_store.get_by_id(&id, &company_id, &user_id).await?;
        Ok(serde_json::to_value(graph).unwrap())
    })
}

fn create_graph(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let graph: Graph = arg(&args, "graph")?;
        let created = ctx.graph_store.create(graph).await?;
        Ok(serde_json::to_value(created).unwrap())
    })
}

fn update_graph(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let graph: Graph = arg(&args, "graph")?;
        let updated = ctx.graph_store.update(graph).await?;
        Ok(serde_json::to_value(updated).unwrap())
    })
}

fn delete_graph(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let id: String = arg(&args, "id")?;
        let company_id: String = arg(&args, "companyId")?;
        let user_id: String = arg(&args, "userId")?;
        let deleted = ctx.graph_store.delete(&id, &company_id, &user_id).await?;
        Ok(json!({ "deleted": deleted }))
    })
}

fn get_rag_context(args: Value, ctx: ToolContext) -> ToolFuture {
    Box::pin(async move {
        let company_id: String = arg(&args, "companyId")?;
        let embedding: Vec<f32> = arg(&args, "embedding")?;
        let limit: usize = opt_arg(&args, "limit").unwrap_or(5);
        let graphs = ctx
            .graph_store
            .query_similar(&company_id, &embedding, limit)
            .await?;
        Ok(serde_json::to_value(graphs).unwrap())
    })
}

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Build the fixed sixteen-tool table (spec.md 4.I). Constructed fresh
/// per `McpSession` rather than shared, since the schemas are cheap
/// static data and sharing would need an `Arc` for no real benefit.
pub fn tool_table() -> Vec<Tool> {
    vec![
        Tool {
            name: "generate_code",
            description: "Submit a kubernetes graph for manifest generation",
            input_schema: schema(
                json!({"graph": {"type": "object"}, "options": {"type": "object"}, "userContext": {"type": "array"}}),
                &["graph"],
            ),
            handler: generate_code,
        },
        Tool {
            name: "get_codegen_status",
            description: "Get the status of a codegen job",
            input_schema: schema(json!({"jobId": {"type": "string"}}), &["jobId"]),
            handler: get_codegen_status,
        },
        Tool {
            name: "cancel_codegen",
            description: "Cancel a running codegen job",
            input_schema: schema(json!({"jobId": {"type": "string"}}), &["jobId"]),
            handler: cancel_codegen,
        },
        Tool {
            name: "validate_graph",
            description: "Structurally validate a graph",
            input_schema: schema(json!({"graph": {"type": "object"}}), &["graph"]),
            handler: validate_graph_tool,
        },
        Tool {
            name: "get_manifests",
            description: "Read back the generated manifests for a completed codegen job",
            input_schema: schema(
                json!({"jobId": {"type": "string"}, "timeoutMs": {"type": "number"}}),
                &["jobId"],
            ),
            handler: get_manifests,
        },
        Tool {
            name: "create_plan",
            description: "Turn a freeform request into a validated graph",
            input_schema: schema(
                json!({"request": {"type": "string"}, "companyId": {"type": "string"}, "userId": {"type": "string"}}),
                &["request", "companyId", "userId"],
            ),
            handler: create_plan,
        },
        Tool {
            name: "get_plan_status",
            description: "Get the status of a plan workflow thread",
            input_schema: schema(json!({"threadId": {"type": "string"}}), &["threadId"]),
            handler: get_plan_status,
        },
        Tool {
            name: "cancel_plan",
            description: "Cancel a running plan workflow",
            input_schema: schema(json!({"threadId": {"type": "string"}}), &["threadId"]),
            handler: cancel_plan,
        },
        Tool {
            name: "analyze_request",
            description: "Preview the plan context a request would produce, without generating a graph",
            input_schema: schema(json!({"request": {"type": "string"}}), &["request"]),
            handler: analyze_request,
        },
        Tool {
            name: "get_plan_graph",
            description: "Read back the graph produced by a completed plan workflow",
            input_schema: schema(json!({"threadId": {"type": "string"}}), &["threadId"]),
            handler: get_plan_graph,
        },
        Tool {
            name: "query_graphs",
            description: "List graphs owned by a company",
            input_schema: schema(
                json!({"companyId": {"type": "string"}, "limit": {"type": "number"}}),
                &["companyId"],
            ),
            handler: query_graphs,
        },
        Tool {
            name: "get_graph",
            description: "Fetch a single graph by id",
            input_schema: schema(
                json!({"id": {"type": "string"}, "companyId": {"type": "string"}, "userId": {"type": "string"}}),
                &["id", "companyId", "userId"],
            ),
            handler: get_graph,
        },
        Tool {
            name: "create_graph",
            description: "Persist a new graph",
            input_schema: schema(json!({"graph": {"type": "object"}}), &["graph"]),
            handler: create_graph,
        },
        Tool {
            name: "update_graph",
            description: "Overwrite an existing graph",
            input_schema: schema(json!({"graph": {"type": "object"}}), &["graph"]),
            handler: update_graph,
        },
        Tool {
            name: "delete_graph",
            description: "Delete a graph by id",
            input_schema: schema(
                json!({"id": {"type": "string"}, "companyId": {"type": "string"}, "userId": {"type": "string"}}),
                &["id", "companyId", "userId"],
            ),
            handler: delete_graph,
        },
        Tool {
            name: "get_rag_context",
            description: "Find graphs similar to an embedding, for retrieval-augmented context",
            input_schema: schema(
                json!({"companyId": {"type": "string"}, "embedding": {"type": "array"}, "limit": {"type": "number"}}),
                &["companyId", "embedding"],
            ),
            handler: get_rag_context,
        },
    ]
}
