//! [`Checkpointer`] — component (D): per-thread workflow state
//! persistence atop [`forge_kv::KvStore`].
//!
//! Key layout under the checkpointer's prefix, per thread id:
//!   state:<thread>    full serialized state `S` (header embedded)
//!   metadata:<thread>  same payload, read independently of `state`
//!   status:<thread>    just the extracted [`WorkflowHeader`], for cheap reads
//!   threads:<thread>   membership marker, scanned to list/enumerate threads
//!
//! `forge-kv` has no native set type, so the thread index is a set of
//! single-value keys under a shared prefix rather than one key holding a
//! list.

use crate::error::{CheckpointError, Result};
use crate::header::{HasHeader, WorkflowHeader, WorkflowStatus};
use crate::stats::CheckpointStats;
use chrono::{Duration as ChronoDuration, Utc};
use forge_kv::KvStore;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Default TTL applied to every checkpoint record (spec.md 4.D, 6.2):
/// refreshed on every write so a live thread never silently expires.
pub const DEFAULT_RECORD_TTL_SECS: i64 = 24 * 60 * 60;

pub struct Checkpointer<S> {
    store: Arc<dyn KvStore>,
    prefix: String,
    ttl_secs: i64,
    _marker: PhantomData<fn() -> S>,
}

impl<S> Checkpointer<S>
where
    S: HasHeader + Serialize + DeserializeOwned + Send + Sync + Clone + 'static,
{
    pub fn new(store: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            ttl_secs: DEFAULT_RECORD_TTL_SECS,
            _marker: PhantomData,
        }
    }

    pub fn with_ttl_secs(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    fn key(&self, segment: &str, thread: &str) -> Vec<String> {
        vec![self.prefix.clone(), segment.to_string(), thread.to_string()]
    }

    fn expiry(&self) -> chrono::DateTime<Utc> {
        Utc::now() + ChronoDuration::seconds(self.ttl_secs)
    }

    /// Persist `state`, writing both `state:<thread>` and `metadata:<thread>`
    /// and refreshing `status:<thread>` from its embedded header, plus the
    /// thread index marker.
    pub async fn save(&self, thread: &str, state: &S) -> Result<()> {
        let value = serde_json::to_value(state)?;
        let expiry = self.expiry();

        self.store
            .set(&self.key("state", thread), value.clone(), Some(expiry))
            .await?;
        self.store
            .set(&self.key("metadata", thread), value, Some(expiry))
            .await?;

        let header_value = serde_json::to_value(state.header())?;
        self.store
            .set(&self.key("status", thread), header_value, Some(expiry))
            .await?;

        self.store
            .set(
                &self.key("threads", thread),
                serde_json::Value::Bool(true),
                Some(expiry),
            )
            .await?;

        debug!(thread, status = ?state.header().status, "checkpoint saved");
        Ok(())
    }

    pub async fn load(&self, thread: &str) -> Result<Option<S>> {
        match self.store.get(&self.key("state", thread)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Like [`Self::load`] but reads the independent `metadata:<thread>`
    /// record and returns its header alongside the state, for callers that
    /// want the header without trusting `state`'s own copy is current.
    pub async fn load_with_metadata(&self, thread: &str) -> Result<Option<(S, WorkflowHeader)>> {
        let meta = match self.store.get(&self.key("metadata", thread)).await? {
            Some(value) => value,
            None => return Ok(None),
        };
        let state: S = serde_json::from_value(meta)?;
        let header = state.header().clone();
        Ok(Some((state, header)))
    }

    pub async fn get_status(&self, thread: &str) -> Result<Option<WorkflowHeader>> {
        match self.store.get(&self.key("status", thread)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Update status in place. If a full `state:<thread>` record exists,
    /// its embedded header is mutated and the state resaved so `state` and
    /// `status` stay consistent; otherwise only `status:<thread>` is
    /// touched. `step_history` only grows: `step`, if given, is appended
    /// only when it isn't already the last entry.
    pub async fn update_status(
        &self,
        thread: &str,
        status: WorkflowStatus,
        step: Option<&str>,
        error: Option<String>,
    ) -> Result<()> {
        let expiry = self.expiry();

        if let Some(state_value) = self.store.get(&self.key("state", thread)).await? {
            let mut state: S = serde_json::from_value(state_value)?;
            apply_status(state.header_mut(), status, step, error.clone());

            let value = serde_json::to_value(&state)?;
            self.store
                .set(&self.key("state", thread), value.clone(), Some(expiry))
                .await?;
            self.store
                .set(&self.key("metadata", thread), value, Some(expiry))
                .await?;
            self.store
                .set(
                    &self.key("status", thread),
                    serde_json::to_value(state.header())?,
                    Some(expiry),
                )
                .await?;
        } else {
            let mut header = self
                .get_status(thread)
                .await?
                .ok_or_else(|| CheckpointError::NotFound(thread.to_string()))?;
            apply_status(&mut header, status, step, error);
            self.store
                .set(
                    &self.key("status", thread),
                    serde_json::to_value(&header)?,
                    Some(expiry),
                )
                .await?;
        }

        self.store
            .set(
                &self.key("threads", thread),
                serde_json::Value::Bool(true),
                Some(expiry),
            )
            .await?;
        Ok(())
    }

    pub async fn list_threads(&self) -> Result<Vec<String>> {
        let prefix = vec![self.prefix.clone(), "threads".to_string()];
        let mut stream = self.store.scan(&prefix).await?;
        let mut threads = Vec::new();
        while let Some(entry) = stream.next().await {
            let (key, _) = entry?;
            if let Some(thread) = key.last() {
                threads.push(thread.clone());
            }
        }
        Ok(threads)
    }

    pub async fn delete(&self, thread: &str) -> Result<()> {
        self.store.remove(&self.key("state", thread)).await?;
        self.store.remove(&self.key("metadata", thread)).await?;
        self.store.remove(&self.key("status", thread)).await?;
        self.store.remove(&self.key("threads", thread)).await?;
        Ok(())
    }

    /// Delete every thread whose status is terminal and whose `end_time`
    /// is older than `max_age_secs`. Returns the number of threads deleted.
    pub async fn cleanup(&self, max_age_secs: i64) -> Result<usize> {
        let cutoff = Utc::now() - ChronoDuration::seconds(max_age_secs);
        let threads = self.list_threads().await?;
        let mut removed = 0;

        for thread in threads {
            let Some(header) = self.get_status(&thread).await? else {
                continue;
            };
            if header.status.is_terminal() {
                if let Some(end_time) = header.end_time {
                    if end_time < cutoff {
                        self.delete(&thread).await?;
                        removed += 1;
                    }
                }
            }
        }
        Ok(removed)
    }

    pub async fn get_stats(&self) -> Result<CheckpointStats> {
        let threads = self.list_threads().await?;
        let mut stats = CheckpointStats::default();
        for thread in threads {
            if let Some(header) = self.get_status(&thread).await? {
                stats.record(header.status);
            }
        }
        Ok(stats)
    }
}

fn apply_status(
    header: &mut WorkflowHeader,
    status: WorkflowStatus,
    step: Option<&str>,
    error: Option<String>,
) {
    if let Some(step) = step {
        if header.step_history.last().map(String::as_str) != Some(step) {
            header.step_history.push(step.to_string());
        }
        header.current_step = step.to_string();
    }
    if status.is_terminal() {
        header.finalize(status, error);
    } else {
        header.status = status;
        if error.is_some() {
            header.error = error;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_kv::InMemoryKvStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestState {
        header: WorkflowHeader,
        payload: String,
    }

    impl HasHeader for TestState {
        fn header(&self) -> &WorkflowHeader {
            &self.header
        }
        fn header_mut(&mut self) -> &mut WorkflowHeader {
            &mut self.header
        }
    }

    fn checkpointer() -> Checkpointer<TestState> {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        Checkpointer::new(store, "cp")
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let cp = checkpointer();
        let state = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "hello".into(),
        };
        cp.save("t1", &state).await.unwrap();

        let loaded = cp.load("t1").await.unwrap().unwrap();
        assert_eq!(loaded.payload, "hello");
        assert_eq!(loaded.header.current_step, "start");
    }

    #[tokio::test]
    async fn load_missing_thread_is_none() {
        let cp = checkpointer();
        assert!(cp.load("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_status_appends_step_history_and_keeps_state_consistent() {
        let cp = checkpointer();
        let state = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "x".into(),
        };
        cp.save("t1", &state).await.unwrap();

        cp.update_status("t1", WorkflowStatus::Running, Some("analyze"), None)
            .await
            .unwrap();

        let status = cp.get_status("t1").await.unwrap().unwrap();
        assert_eq!(status.status, WorkflowStatus::Running);
        assert_eq!(status.current_step, "analyze");
        assert_eq!(status.step_history, vec!["analyze".to_string()]);

        let loaded = cp.load("t1").await.unwrap().unwrap();
        assert_eq!(loaded.header.current_step, "analyze");
    }

    #[tokio::test]
    async fn finalize_sets_end_time_exactly_once() {
        let cp = checkpointer();
        let state = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "x".into(),
        };
        cp.save("t1", &state).await.unwrap();

        cp.update_status("t1", WorkflowStatus::Completed, None, None)
            .await
            .unwrap();
        let first = cp.get_status("t1").await.unwrap().unwrap();
        let end_time = first.end_time.unwrap();

        cp.update_status("t1", WorkflowStatus::Completed, None, None)
            .await
            .unwrap();
        let second = cp.get_status("t1").await.unwrap().unwrap();
        assert_eq!(second.end_time.unwrap(), end_time);
    }

    #[tokio::test]
    async fn list_threads_reflects_saved_threads() {
        let cp = checkpointer();
        let state = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "x".into(),
        };
        cp.save("t1", &state).await.unwrap();
        cp.save("t2", &state).await.unwrap();

        let mut threads = cp.list_threads().await.unwrap();
        threads.sort();
        assert_eq!(threads, vec!["t1".to_string(), "t2".to_string()]);
    }

    #[tokio::test]
    async fn delete_removes_all_records() {
        let cp = checkpointer();
        let state = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "x".into(),
        };
        cp.save("t1", &state).await.unwrap();
        cp.delete("t1").await.unwrap();

        assert!(cp.load("t1").await.unwrap().is_none());
        assert!(cp.get_status("t1").await.unwrap().is_none());
        assert!(cp.list_threads().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cleanup_removes_old_terminal_threads_only() {
        let cp = checkpointer();
        let mut old_state = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "x".into(),
        };
        old_state.header.start_time = Utc::now() - ChronoDuration::days(2);
        cp.save("old", &old_state).await.unwrap();
        cp.update_status("old", WorkflowStatus::Completed, None, None)
            .await
            .unwrap();
        // Force end_time into the past directly through a fresh save.
        let mut aged = cp.load("old").await.unwrap().unwrap();
        aged.header.end_time = Some(Utc::now() - ChronoDuration::days(2));
        cp.save("old", &aged).await.unwrap();

        let running_state = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "y".into(),
        };
        cp.save("running", &running_state).await.unwrap();

        let removed = cp.cleanup(3600).await.unwrap();
        assert_eq!(removed, 1);
        assert!(cp.load("old").await.unwrap().is_none());
        assert!(cp.load("running").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_stats_counts_by_status() {
        let cp = checkpointer();
        let pending = TestState {
            header: WorkflowHeader::new("start", 3),
            payload: "x".into(),
        };
        cp.save("t1", &pending).await.unwrap();
        cp.save("t2", &pending).await.unwrap();
        cp.update_status("t2", WorkflowStatus::Completed, None, None)
            .await
            .unwrap();

        let stats = cp.get_stats().await.unwrap();
        assert_eq!(stats.total_threads, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completed, 1);
    }
}
