//! `forge-engine` — component (E): the abstract step-based workflow
//! engine. Generic over a state type; concrete workflows (`forge-workflows`)
//! supply a [`WorkflowSpec`] describing their steps, handlers, and hooks.

pub mod engine;
pub mod error;
pub mod event;
pub mod spec;

pub use engine::WorkflowEngine;
pub use error::{EngineError, Result};
pub use event::{EngineEvent, EventKind};
pub use spec::{ExecutionContext, WorkflowSpec};
