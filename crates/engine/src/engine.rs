//! [`WorkflowEngine`] — component (E): the execution loop, retry, and
//! cancellation over a [`WorkflowSpec`].

use crate::error::{EngineError, Result};
use crate::event::{EngineEvent, EventKind};
use crate::spec::{ExecutionContext, WorkflowSpec};
use forge_checkpoint::{Checkpointer, CheckpointStats, HasHeader, WorkflowStatus};
use forge_pubsub::PubSub;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of the internal step loop: either it ran to a terminal state
/// on its own, or it observed an externally-written `cancelled` status
/// at a step boundary and stopped without finalizing (the canceller
/// already did that).
enum StepOutcome<S> {
    Done(S),
    Cancelled(S),
}

pub struct WorkflowEngine<S, W>
where
    S: HasHeader + Clone + Send + Sync + 'static,
    W: WorkflowSpec<S>,
{
    checkpointer: Checkpointer<S>,
    events: PubSub<EngineEvent>,
    spec: Arc<W>,
}

impl<S, W> WorkflowEngine<S, W>
where
    S: HasHeader
        + Clone
        + Send
        + Sync
        + serde::Serialize
        + serde::de::DeserializeOwned
        + 'static,
    W: WorkflowSpec<S>,
{
    pub fn new(checkpointer: Checkpointer<S>, events: PubSub<EngineEvent>, spec: Arc<W>) -> Self {
        Self {
            checkpointer,
            events,
            spec,
        }
    }

    fn channel(&self, thread_id: &str) -> String {
        format!("{}:{}", self.spec.channel_prefix(), thread_id)
    }

    async fn publish(&self, thread_id: &str, event: EventKind, state: &S) {
        let payload = EngineEvent {
            thread_id: thread_id.to_string(),
            event,
            status: state.header().status,
            current_step: state.header().current_step.clone(),
            error: state.header().error.clone(),
        };
        if let Err(e) = self.events.publish(&self.channel(thread_id), &payload).await {
            warn!(thread_id, error = %e, "failed to publish engine event");
        }
    }

    /// `execute(initialState, context)` (spec.md 4.E): runs to
    /// completion, publishing exactly one of
    /// `{completed, failed, cancelled}` as its terminal event (I1).
    pub async fn execute(&self, mut state: S, ctx: &ExecutionContext) -> Result<S> {
        state.header_mut().status = WorkflowStatus::Running;
        self.checkpointer.save(&ctx.thread_id, &state).await?;
        self.publish(&ctx.thread_id, EventKind::Started, &state).await;

        match self.run_steps(state, ctx).await {
            Ok(StepOutcome::Done(final_state)) => {
                self.checkpointer.save(&ctx.thread_id, &final_state).await?;
                let event = match final_state.header().status {
                    WorkflowStatus::Failed => EventKind::Failed,
                    _ => EventKind::Completed,
                };
                self.publish(&ctx.thread_id, event, &final_state).await;
                Ok(final_state)
            }
            // `cancel()` already checkpointed and published `cancelled`
            // from outside this call; nothing left to do here.
            Ok(StepOutcome::Cancelled(state)) => Ok(state),
            Err((mut state, message)) => {
                state.header_mut().finalize(WorkflowStatus::Failed, Some(message.clone()));
                let _ = self.checkpointer.save(&ctx.thread_id, &state).await;
                self.publish(&ctx.thread_id, EventKind::Failed, &state).await;
                Err(EngineError::Unhandled(message))
            }
        }
    }

    /// `executeStep` (spec.md 4.E), implemented iteratively rather than
    /// via actual recursion so a pathological retry/step count doesn't
    /// grow the call stack. Checks for an externally-written
    /// `status=cancelled` at the top of every iteration — the only
    /// step-boundary point at which cancellation is observed.
    async fn run_steps(
        &self,
        mut state: S,
        ctx: &ExecutionContext,
    ) -> std::result::Result<StepOutcome<S>, (S, String)> {
        loop {
            if let Ok(Some(header)) = self.checkpointer.get_status(&ctx.thread_id).await {
                if header.status == WorkflowStatus::Cancelled {
                    // `cancel()` wrote the authoritative cancelled record
                    // directly to the checkpointer from outside this
                    // call; reload it rather than return our
                    // possibly-stale in-flight `state`.
                    let cancelled = self
                        .checkpointer
                        .load(&ctx.thread_id)
                        .await
                        .map_err(|e| (state.clone(), e.to_string()))?
                        .unwrap_or(state);
                    return Ok(StepOutcome::Cancelled(cancelled));
                }
            }

            self.checkpointer
                .save(&ctx.thread_id, &state)
                .await
                .map_err(|e| (state.clone(), e.to_string()))?;

            let current_step = state.header().current_step.clone();
            info!(thread_id = %ctx.thread_id, step = %current_step, "dispatching step");

            match self.spec.handle(&current_step, &state, ctx).await {
                Ok(mut next_state) => {
                    let is_terminal = self
                        .spec
                        .terminal_steps()
                        .iter()
                        .any(|s| s == &current_step);

                    if !self.spec.should_continue(&next_state) || is_terminal {
                        next_state.header_mut().finalize(WorkflowStatus::Completed, None);
                        return Ok(StepOutcome::Done(next_state));
                    }

                    match self.spec.get_next_step(&next_state, &current_step) {
                        Some(next_step) => {
                            let header = next_state.header_mut();
                            header.step_history.push(current_step.clone());
                            header.current_step = next_step;
                            header.status = WorkflowStatus::Running;
                            state = next_state;
                        }
                        None => {
                            next_state.header_mut().finalize(WorkflowStatus::Completed, None);
                            return Ok(StepOutcome::Done(next_state));
                        }
                    }
                }
                Err(error_message) => {
                    self.spec.on_step_error(&mut state, &error_message);
                    self.publish(&ctx.thread_id, EventKind::StepFailed, &state).await;

                    let header = state.header_mut();
                    if header.retry_count < header.max_retries {
                        header.retry_count += 1;
                    } else {
                        header.finalize(WorkflowStatus::Failed, Some(error_message));
                        return Ok(StepOutcome::Done(state));
                    }
                }
            }
        }
    }

    /// `cancel(thread)` (spec.md 4.E): boundary-only, does not interrupt
    /// a step currently executing.
    pub async fn cancel(&self, thread_id: &str) -> Result<bool> {
        let Some(mut state) = self.checkpointer.load(thread_id).await? else {
            return Ok(false);
        };
        if state.header().status.is_terminal() {
            return Ok(false);
        }

        state
            .header_mut()
            .finalize(WorkflowStatus::Cancelled, Some("cancelled by caller".to_string()));
        self.checkpointer.save(thread_id, &state).await?;
        self.publish(thread_id, EventKind::Cancelled, &state).await;
        Ok(true)
    }

    pub async fn get_status(&self, thread_id: &str) -> Result<Option<forge_checkpoint::WorkflowHeader>> {
        Ok(self.checkpointer.get_status(thread_id).await?)
    }

    /// The full checkpointed state for a thread, not just its header.
    /// Used by callers that need more than the status summary — e.g. the
    /// MCP `get_plan_graph` tool reading back a generated graph.
    pub async fn get_state(&self, thread_id: &str) -> Result<Option<S>> {
        Ok(self.checkpointer.load(thread_id).await?)
    }

    /// Checkpointer-backed introspection for a health endpoint.
    pub async fn get_stats(&self) -> Result<CheckpointStats> {
        Ok(self.checkpointer.get_stats().await?)
    }

    /// Prunes terminal threads older than `max_age_secs`. Run on a
    /// timer by the binary that owns this engine; not called from
    /// anywhere in the execution loop itself.
    pub async fn cleanup(&self, max_age_secs: i64) -> Result<usize> {
        Ok(self.checkpointer.cleanup(max_age_secs).await?)
    }
}
