//! [`WorkflowSpec`] — a concrete workflow's configuration: its step
//! table, handlers, and the hooks the engine calls at step boundaries.
//! Per spec.md 9's design note, this is a record-of-handlers the
//! abstract engine drives, not a subclassing hierarchy.

use async_trait::async_trait;
use forge_checkpoint::HasHeader;

/// Context passed into [`crate::WorkflowEngine::execute`]: everything a
/// step handler might need beyond the state itself.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub thread_id: String,
    pub job_id: Option<String>,
    pub user_id: Option<String>,
    pub company_id: Option<String>,
    pub user_context: Vec<serde_json::Value>,
}

impl ExecutionContext {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait WorkflowSpec<S>: Send + Sync
where
    S: HasHeader + Clone + Send + Sync + 'static,
{
    /// Linear step order; the default `get_next_step` walks this list.
    fn steps(&self) -> &[String];

    fn initial_step(&self) -> &str;

    fn terminal_steps(&self) -> &[String];

    /// Channel prefix events are published under: `<prefix>:<threadId>`.
    fn channel_prefix(&self) -> &str;

    /// Run the handler for `step`, reading (not consuming) `state`.
    /// Returns the next state on success, or an error message on
    /// failure — the engine retains the original `state` either way.
    async fn handle(&self, step: &str, state: &S, ctx: &ExecutionContext) -> Result<S, String>;

    /// Default: false when the current step is terminal, true otherwise
    /// (the terminal check itself is applied by the engine). Concrete
    /// workflows override to add their own abort conditions (e.g.
    /// validation errors, a retry-loop ceiling).
    fn should_continue(&self, _state: &S) -> bool {
        true
    }

    /// Default: append `currentStep` to `stepHistory` (done by the
    /// engine) and return the next entry in `steps()`, or `None` past
    /// the last step.
    fn get_next_step(&self, _state: &S, current_step: &str) -> Option<String> {
        let steps = self.steps();
        let idx = steps.iter().position(|s| s == current_step)?;
        steps.get(idx + 1).cloned()
    }

    /// Default: record the error message on the header. Concrete
    /// workflows override to set additional retry-tone flags.
    fn on_step_error(&self, state: &mut S, error: &str) {
        state.header_mut().error = Some(error.to_string());
    }
}
