//! Lifecycle events published to `<channelPrefix>:<threadId>` (spec.md
//! 6.5): `started|step_failed|completed|failed|cancelled`.

use forge_checkpoint::WorkflowStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Started,
    StepFailed,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineEvent {
    pub thread_id: String,
    pub event: EventKind,
    pub status: WorkflowStatus,
    pub current_step: String,
    pub error: Option<String>,
}
