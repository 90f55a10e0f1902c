//! [`JobService`] — component (H): submits codegen runs as background
//! jobs, owns the content-addressed result cache, and compensates for
//! pub/sub's lack of persistence with the result-waiting protocol in
//! [`JobService::get_generated_code`] (spec.md 4.H).

use crate::error::{JobError, Result};
use crate::types::{
    GeneratedCodeGraph, JobContext, JobEvent, JobEventKind, JobOptions, JobStatusInfo,
    JobSubmission,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use forge_cache::WriteThroughCache;
use forge_checkpoint::WorkflowStatus;
use forge_engine::{ExecutionContext, WorkflowEngine};
use forge_graph::{compute_graph_hash, validate_graph, Graph, HashOptions};
use forge_kv::Key;
use forge_pubsub::PubSub;
use forge_workflows::{CodegenState, CodegenWorkflow};
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

fn ttl_1h() -> DateTime<Utc> {
    Utc::now() + ChronoDuration::hours(1)
}

fn status_key(job_id: &str) -> Key {
    vec!["job".to_string(), job_id.to_string(), "status".to_string()]
}

fn context_key(job_id: &str) -> Key {
    vec!["job".to_string(), job_id.to_string(), "context".to_string()]
}

fn result_key(job_id: &str) -> Key {
    vec!["job".to_string(), job_id.to_string(), "result".to_string()]
}

fn cache_key_for_hash(hash: &str) -> Key {
    vec!["codegen".to_string(), "cache".to_string(), hash.to_string()]
}

fn jobs_channel(job_id: &str) -> String {
    format!("codegen:jobs:{job_id}")
}

fn results_channel(job_id: &str) -> String {
    format!("codegen:results:{job_id}")
}

/// Publish `event` on `codegen:jobs:<jobId>`; terminal kinds are
/// additionally republished on `codegen:results:<jobId>` so a
/// [`JobService::get_generated_code`] subscriber only ever has to watch
/// one channel (spec.md 6.5).
async fn publish(
    events: &PubSub<JobEvent>,
    job_id: &str,
    event: JobEventKind,
    status: WorkflowStatus,
    error: Option<String>,
    result: Option<GeneratedCodeGraph>,
) {
    let payload = JobEvent {
        job_id: job_id.to_string(),
        event,
        status,
        error: error.clone(),
        result: result.clone(),
    };
    if let Err(e) = events.publish(&jobs_channel(job_id), &payload).await {
        warn!(job_id, error = %e, "failed to publish job lifecycle event");
    }

    if matches!(
        event,
        JobEventKind::Completed | JobEventKind::Failed | JobEventKind::Cancelled
    ) {
        let terminal = JobEvent {
            job_id: job_id.to_string(),
            event,
            status,
            error,
            result,
        };
        if let Err(e) = events.publish(&results_channel(job_id), &terminal).await {
            warn!(job_id, error = %e, "failed to publish terminal job event");
        }
    }
}

async fn write_terminal_status(
    cache: &WriteThroughCache,
    job_id: &str,
    status: WorkflowStatus,
    error: Option<String>,
) {
    let info = JobStatusInfo {
        status,
        current_step: None,
        error,
    };
    match serde_json::to_value(&info) {
        Ok(value) => {
            if let Err(e) = cache.set(&status_key(job_id), value, Some(ttl_1h())).await {
                warn!(job_id, error = %e, "failed to write terminal job status");
            }
        }
        Err(e) => warn!(job_id, error = %e, "failed to serialize terminal job status"),
    }
}

pub struct JobService {
    cache: Arc<WriteThroughCache>,
    events: PubSub<JobEvent>,
    engine: Arc<WorkflowEngine<CodegenState, CodegenWorkflow>>,
    active_jobs: Arc<Mutex<HashMap<String, JobContext>>>,
    job_results: Arc<Mutex<HashMap<String, GeneratedCodeGraph>>>,
}

impl JobService {
    pub fn new(
        cache: Arc<WriteThroughCache>,
        events: PubSub<JobEvent>,
        engine: Arc<WorkflowEngine<CodegenState, CodegenWorkflow>>,
    ) -> Self {
        Self {
            cache,
            events,
            engine,
            active_jobs: Arc::new(Mutex::new(HashMap::new())),
            job_results: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// `submitJob(graph, options, userContext?)` (spec.md 4.H.1-5).
    pub async fn submit_job(
        &self,
        graph: Graph,
        options: JobOptions,
        user_context: Vec<String>,
    ) -> Result<JobSubmission> {
        let report = validate_graph(&graph);
        if report.has_errors() {
            return Err(JobError::InvalidGraph(report.errors));
        }

        let graph_hash = if options.enable_cache {
            Some(compute_graph_hash(&graph, &HashOptions::default())?)
        } else {
            None
        };

        if let Some(hash) = &graph_hash {
            if let Some(cached) = self.cache.get(&cache_key_for_hash(hash)).await? {
                let result: GeneratedCodeGraph =
                    serde_json::from_value(cached).map_err(|e| JobError::Other(e.to_string()))?;
                let job_id = Uuid::new_v4().to_string();
                self.job_results
                    .lock()
                    .unwrap()
                    .insert(job_id.clone(), result.clone());
                info!(job_id, graph_hash = %hash, "codegen cache hit, short-circuiting submitJob");
                publish(
                    &self.events,
                    &job_id,
                    JobEventKind::Completed,
                    WorkflowStatus::Completed,
                    None,
                    Some(result),
                )
                .await;
                return Ok(JobSubmission {
                    job_id,
                    status: WorkflowStatus::Completed,
                    step: None,
                });
            }
        }

        // TODO: two submitJob calls racing on the same graph_hash both
        // fall through to here and both run the LLM; a per-hash
        // in-flight lock would coalesce them into one execution.
        let job_id = Uuid::new_v4().to_string();
        let thread_id = job_id.clone();

        let pending = JobStatusInfo {
            status: WorkflowStatus::Pending,
            current_step: Some("queued".to_string()),
            error: None,
        };
        self.cache
            .set(
                &status_key(&job_id),
                serde_json::to_value(&pending).map_err(|e| JobError::Other(e.to_string()))?,
                Some(ttl_1h()),
            )
            .await?;
        if !user_context.is_empty() {
            self.cache
                .set(
                    &context_key(&job_id),
                    serde_json::to_value(&user_context).map_err(|e| JobError::Other(e.to_string()))?,
                    Some(ttl_1h()),
                )
                .await?;
        }

        self.active_jobs.lock().unwrap().insert(
            job_id.clone(),
            JobContext {
                job_id: job_id.clone(),
                thread_id: thread_id.clone(),
                company_id: graph.company_id.clone(),
                user_id: graph.user_id.clone(),
                graph_hash: graph_hash.clone(),
            },
        );

        self.spawn_background(job_id.clone(), thread_id, graph, user_context, graph_hash);

        publish(
            &self.events,
            &job_id,
            JobEventKind::Submitted,
            WorkflowStatus::Pending,
            None,
            None,
        )
        .await;

        Ok(JobSubmission {
            job_id,
            status: WorkflowStatus::Pending,
            step: Some("queued".to_string()),
        })
    }

    /// Convenience wrapper over `submitJob` + `getGeneratedCode` for
    /// callers that want a single blocking round trip bounded by
    /// `options.timeoutMs` (spec.md §1 data flow: submitter → (H) →
    /// caller reads the result).
    pub async fn submit_and_wait(
        &self,
        graph: Graph,
        options: JobOptions,
        user_context: Vec<String>,
    ) -> Result<Option<GeneratedCodeGraph>> {
        let timeout = Duration::from_millis(options.timeout_ms);
        let submission = self.submit_job(graph, options, user_context).await?;
        self.get_generated_code(&submission.job_id, timeout).await
    }

    fn spawn_background(
        &self,
        job_id: String,
        thread_id: String,
        graph: Graph,
        user_context: Vec<String>,
        graph_hash: Option<String>,
    ) {
        let cache = self.cache.clone();
        let events = self.events.clone();
        let engine = self.engine.clone();
        let active_jobs = self.active_jobs.clone();
        let job_results = self.job_results.clone();

        tokio::spawn(async move {
            run_job(
                cache,
                events,
                engine,
                active_jobs,
                job_results,
                job_id,
                thread_id,
                graph,
                user_context,
                graph_hash,
            )
            .await;
        });
    }

    /// `getJobStatus(jobId)` (spec.md 4.H).
    pub async fn get_job_status(&self, job_id: &str) -> Result<Option<JobStatusInfo>> {
        let thread_id = self
            .active_jobs
            .lock()
            .unwrap()
            .get(job_id)
            .map(|c| c.thread_id.clone());

        if let Some(thread_id) = thread_id {
            if let Some(header) = self
                .engine
                .get_status(&thread_id)
                .await
                .map_err(|e| JobError::Workflow(e.to_string()))?
            {
                return Ok(Some(JobStatusInfo {
                    status: header.status,
                    current_step: Some(header.current_step),
                    error: header.error,
                }));
            }
        }

        if let Some(cached) = self.cache.get(&status_key(job_id)).await? {
            let info: JobStatusInfo =
                serde_json::from_value(cached).map_err(|e| JobError::Other(e.to_string()))?;
            return Ok(Some(info));
        }

        if self.cache.get(&result_key(job_id)).await?.is_some() {
            return Ok(Some(JobStatusInfo {
                status: WorkflowStatus::Completed,
                current_step: None,
                error: None,
            }));
        }

        Ok(None)
    }

    /// `getGeneratedCode(jobId, timeoutMs)` (spec.md 4.H). Always closes
    /// its subscription on the way out by letting `stream` drop at the
    /// end of scope.
    pub async fn get_generated_code(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Result<Option<GeneratedCodeGraph>> {
        if let Some(result) = self.job_results.lock().unwrap().get(job_id).cloned() {
            return Ok(Some(result));
        }

        if let Some(cached) = self.cache.get(&result_key(job_id)).await? {
            let result: GeneratedCodeGraph =
                serde_json::from_value(cached).map_err(|e| JobError::Other(e.to_string()))?;
            return Ok(Some(result));
        }

        let is_active = self.active_jobs.lock().unwrap().contains_key(job_id);
        if !is_active {
            return Ok(None);
        }

        let mut stream = self.events.subscribe(&results_channel(job_id), None).await;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            match tokio::time::timeout(remaining, stream.next()).await {
                Ok(Some(event)) => match event.event {
                    JobEventKind::Completed => return Ok(event.result),
                    JobEventKind::Failed | JobEventKind::Cancelled => return Ok(None),
                    _ => continue,
                },
                Ok(None) => return Ok(None),
                Err(_) => return Ok(None),
            }
        }
    }

    /// Boundary-only cancellation (spec.md 5 "Cancellation"). The
    /// background task's next checkpoint-boundary check observes the
    /// `cancelled` status the engine wrote and tears itself down.
    pub async fn cancel_job(&self, job_id: &str) -> Result<bool> {
        let thread_id = self
            .active_jobs
            .lock()
            .unwrap()
            .get(job_id)
            .map(|c| c.thread_id.clone());

        let Some(thread_id) = thread_id else {
            return Ok(false);
        };
        self.engine
            .cancel(&thread_id)
            .await
            .map_err(|e| JobError::Workflow(e.to_string()))
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_job(
    cache: Arc<WriteThroughCache>,
    events: PubSub<JobEvent>,
    engine: Arc<WorkflowEngine<CodegenState, CodegenWorkflow>>,
    active_jobs: Arc<Mutex<HashMap<String, JobContext>>>,
    job_results: Arc<Mutex<HashMap<String, GeneratedCodeGraph>>>,
    job_id: String,
    thread_id: String,
    graph: Graph,
    user_context: Vec<String>,
    graph_hash: Option<String>,
) {
    publish(
        &events,
        &job_id,
        JobEventKind::Started,
        WorkflowStatus::Running,
        None,
        None,
    )
    .await;

    let company_id = graph.company_id.clone();
    let user_id = graph.user_id.clone();
    let mut state = CodegenState::new(graph, company_id.clone(), user_id.clone());
    state.user_context = user_context;

    let ctx = ExecutionContext {
        thread_id: thread_id.clone(),
        job_id: Some(job_id.clone()),
        user_id: Some(user_id),
        company_id: Some(company_id),
        user_context: Vec::new(),
    };

    let outcome = engine.execute(state, &ctx).await;
    active_jobs.lock().unwrap().remove(&job_id);

    match outcome {
        Ok(final_state) if final_state.header.status == WorkflowStatus::Cancelled => {
            write_terminal_status(&cache, &job_id, WorkflowStatus::Cancelled, final_state.header.error.clone()).await;
            publish(
                &events,
                &job_id,
                JobEventKind::Cancelled,
                WorkflowStatus::Cancelled,
                final_state.header.error,
                None,
            )
            .await;
        }
        Ok(final_state) if final_state.header.status == WorkflowStatus::Completed => {
            match (final_state.generated, final_state.kubernetes_graph, final_state.validation) {
                (Some(generated), Some(kubernetes_graph), Some(validation)) => {
                    let result = GeneratedCodeGraph {
                        generated,
                        kubernetes_graph,
                        validation,
                    };
                    let value = match serde_json::to_value(&result) {
                        Ok(v) => v,
                        Err(e) => {
                            warn!(job_id, error = %e, "failed to serialize codegen result");
                            fail(&cache, &events, &job_id, e.to_string()).await;
                            return;
                        }
                    };

                    if let Some(hash) = &graph_hash {
                        if let Err(e) = cache.set(&cache_key_for_hash(hash), value.clone(), Some(ttl_1h())).await {
                            warn!(job_id, error = %e, "failed to write codegen result cache");
                        }
                    }
                    if let Err(e) = cache.set(&result_key(&job_id), value, Some(ttl_1h())).await {
                        warn!(job_id, error = %e, "failed to write job result cache");
                    }
                    write_terminal_status(&cache, &job_id, WorkflowStatus::Completed, None).await;

                    job_results.lock().unwrap().insert(job_id.clone(), result.clone());
                    publish(
                        &events,
                        &job_id,
                        JobEventKind::Completed,
                        WorkflowStatus::Completed,
                        None,
                        Some(result),
                    )
                    .await;
                }
                _ => {
                    fail(
                        &cache,
                        &events,
                        &job_id,
                        "codegen workflow completed without a generated result".to_string(),
                    )
                    .await;
                }
            }
        }
        Ok(final_state) => {
            let error = final_state
                .header
                .error
                .unwrap_or_else(|| "codegen workflow failed".to_string());
            fail(&cache, &events, &job_id, error).await;
        }
        Err(e) => {
            fail(&cache, &events, &job_id, e.to_string()).await;
        }
    }
}

async fn fail(cache: &WriteThroughCache, events: &PubSub<JobEvent>, job_id: &str, error: String) {
    write_terminal_status(cache, job_id, WorkflowStatus::Failed, Some(error.clone())).await;
    publish(
        events,
        job_id,
        JobEventKind::Failed,
        WorkflowStatus::Failed,
        Some(error),
        None,
    )
    .await;
}
