//! `forge-checkpoint` — component (D): the checkpointer.
//!
//! Persists per-thread workflow state, status metadata, and a thread
//! index atop [`forge_kv::KvStore`]; supports load, status query, status
//! update, delete, listing, cleanup, and stats.

pub mod checkpointer;
pub mod error;
pub mod header;
pub mod stats;

pub use checkpointer::Checkpointer;
pub use error::{CheckpointError, Result};
pub use header::{HasHeader, WorkflowHeader, WorkflowStatus};
pub use stats::CheckpointStats;
