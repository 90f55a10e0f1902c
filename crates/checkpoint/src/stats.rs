//! Aggregate checkpoint store statistics (spec.md 4.D: "stats").

use crate::header::WorkflowStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointStats {
    pub total_threads: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl CheckpointStats {
    pub fn record(&mut self, status: WorkflowStatus) {
        self.total_threads += 1;
        match status {
            WorkflowStatus::Pending => self.pending += 1,
            WorkflowStatus::Running => self.running += 1,
            WorkflowStatus::Completed => self.completed += 1,
            WorkflowStatus::Failed => self.failed += 1,
            WorkflowStatus::Cancelled => self.cancelled += 1,
        }
    }
}
