//! `forge-jobs` — component (H): the job service. Submits codegen runs
//! as detached background tasks, owns the content-addressed result
//! cache, and implements the result-waiting protocol that compensates
//! for (C)'s lack of pub/sub persistence.

pub mod error;
pub mod service;
pub mod types;

pub use error::{JobError, Result};
pub use service::JobService;
pub use types::{
    GeneratedCodeGraph, JobContext, JobEvent, JobEventKind, JobOptions, JobStatusInfo,
    JobSubmission,
};
