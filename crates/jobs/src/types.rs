//! Request/response and event shapes for the job service (spec.md 4.H).

use forge_checkpoint::WorkflowStatus;
use forge_graph::{Graph, ValidationReport};
use forge_workflows::GeneratedConfigurations;
use serde::{Deserialize, Serialize};

/// `submitJob`'s options argument. `enableCache` defaults to true;
/// `timeout` bounds `getGeneratedCode`'s wait from outside the workflow
/// (spec.md 5 "Timeouts").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOptions {
    #[serde(default = "default_enable_cache")]
    pub enable_cache: bool,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_enable_cache() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    5 * 60 * 1000
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            enable_cache: default_enable_cache(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Result of a successful codegen run, cached under
/// `codegen:cache:<graphHash>` and `job:<id>:result` (spec.md 4.H, 6.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCodeGraph {
    pub generated: GeneratedConfigurations,
    pub kubernetes_graph: Graph,
    pub validation: ValidationReport,
}

/// `submitJob`'s immediate return value (spec.md 4.H.1-5).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job_id: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub step: Option<String>,
}

/// In-process bookkeeping for a job with a running or about-to-run
/// background task (spec.md 4.H "State: activeJobs").
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: String,
    pub thread_id: String,
    pub company_id: String,
    pub user_id: String,
    pub graph_hash: Option<String>,
}

/// Lifecycle event published on `codegen:jobs:<jobId>`; terminal kinds
/// (`Completed`, `Failed`) are additionally published on
/// `codegen:results:<jobId>` (spec.md 6.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    Submitted,
    Started,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    pub job_id: String,
    pub event: JobEventKind,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub result: Option<GeneratedCodeGraph>,
}

/// `getJobStatus`'s return shape: either a live engine-reported header
/// status or a status synthesised from the cache (spec.md 4.H.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusInfo {
    pub status: WorkflowStatus,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
