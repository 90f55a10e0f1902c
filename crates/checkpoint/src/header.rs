//! [`WorkflowHeader`] — the common header every workflow state carries
//! (spec.md §3 "WorkflowState"), and [`WorkflowStatus`], its status
//! enumeration (spec.md §4.D: `pending -> running -> {completed, failed,
//! cancelled}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl WorkflowStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Cancelled
        )
    }
}

/// Header fields common to every concrete workflow state. A concrete
/// workflow's state struct embeds this directly (see `forge-workflows`)
/// rather than duplicating its fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowHeader {
    pub current_step: String,
    pub step_history: Vec<String>,
    pub status: WorkflowStatus,
    pub retry_count: u32,
    pub max_retries: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
}

impl WorkflowHeader {
    pub fn new(initial_step: impl Into<String>, max_retries: u32) -> Self {
        Self {
            current_step: initial_step.into(),
            step_history: Vec::new(),
            status: WorkflowStatus::Pending,
            retry_count: 0,
            max_retries,
            start_time: Utc::now(),
            end_time: None,
            duration_ms: None,
            error: None,
        }
    }

    /// Mark the header terminal, setting `end_time`/`duration_ms` exactly
    /// once (per spec.md 4.D's invariant; a second call is a no-op on
    /// those two fields).
    pub fn finalize(&mut self, status: WorkflowStatus, error: Option<String>) {
        debug_assert!(status.is_terminal());
        self.status = status;
        if self.error.is_none() {
            self.error = error;
        }
        if self.end_time.is_none() {
            let end = Utc::now();
            self.end_time = Some(end);
            self.duration_ms = Some((end - self.start_time).num_milliseconds());
        }
    }
}

/// Types that embed a [`WorkflowHeader`] can be checkpointed.
pub trait HasHeader {
    fn header(&self) -> &WorkflowHeader;
    fn header_mut(&mut self) -> &mut WorkflowHeader;
}
