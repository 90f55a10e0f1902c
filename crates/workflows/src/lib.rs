//! `forge-workflows` — components (F) and (G): the plan workflow and the
//! codegen workflow, built on top of `forge-engine`'s abstract step
//! loop.

pub mod codegen;
pub mod error;
pub mod json_repair;
pub mod plan;
pub mod prompts;
pub mod rag;
pub mod state;
pub mod store;

pub use codegen::CodegenWorkflow;
pub use error::{Result, WorkflowError};
pub use plan::PlanWorkflow;
pub use state::{CodegenState, GeneratedConfigurations, GeneratedManifest, PlanState, TargetMessage};
pub use store::{GraphStore, InMemoryGraphStore};
