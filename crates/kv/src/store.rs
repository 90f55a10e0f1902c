//! The [`KvStore`] trait — namespaced key/value storage with optional
//! absolute expiry and prefix scan.
//!
//! This is component (A) of the engine: a minimal async trait that both
//! the process-local [`crate::memory::InMemoryKvStore`] and any external
//! store (Redis, etcd, a cloud KV service) can implement. Every other
//! component in the workspace — the write-through cache, the
//! checkpointer, session storage — talks to its backing store only
//! through this trait.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde_json::Value;

/// A key is a vector of string components, joined by the implementation
/// using [`crate::key::join_key`] (or an equivalent reversible scheme).
pub type Key = Vec<String>;

/// One scanned entry: the original (unjoined) key plus its value.
pub type ScanEntry = (Key, Value);

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the value at `key`, or `None` if absent or expired.
    async fn get(&self, key: &Key) -> Result<Option<Value>>;

    /// Write `value` at `key`. `expiry`, if set, is an absolute instant
    /// after which the entry is treated as absent by [`Self::get`] and
    /// skipped by [`Self::scan`].
    async fn set(&self, key: &Key, value: Value, expiry: Option<DateTime<Utc>>) -> Result<()>;

    /// Remove the value at `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &Key) -> Result<()>;

    /// Lazily scan all non-expired entries whose key starts with `prefix`.
    ///
    /// Implementations must not block other operations while the
    /// returned stream is being drained (paged fetch on remote backends,
    /// snapshot-based iteration on the in-memory one).
    async fn scan(&self, prefix: &Key) -> Result<BoxStream<'static, Result<ScanEntry>>>;
}
