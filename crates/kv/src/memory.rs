//! In-process, thread-safe [`KvStore`] backed by a `HashMap`.
//!
//! Reference implementation for development, tests, and single-process
//! deployments. Modeled on the teacher's `InMemoryCheckpointSaver`
//! (`langgraph-checkpoint::memory`): a `RwLock`-guarded map, a `clear()`
//! escape hatch for test isolation, and expired-entry eviction applied
//! lazily on read rather than via a background sweep.

use crate::error::Result;
use crate::key::{has_prefix, join_key, split_key};
use crate::store::{Key, KvStore, ScanEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expiry: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|e| e <= now)
    }
}

/// Process-local key/value store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKvStore {
    data: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every entry. Useful for test isolation.
    pub async fn clear(&self) {
        self.data.write().await.clear();
    }

    /// Number of entries currently stored, including ones that have
    /// expired but not yet been evicted by a read.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        let joined = join_key(key);
        let now = Utc::now();

        {
            let data = self.data.read().await;
            match data.get(&joined) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Expired: evict (best-effort from the caller's point of view;
        // here it's just a lock upgrade, so we do it properly).
        self.data.write().await.remove(&joined);
        Ok(None)
    }

    async fn set(&self, key: &Key, value: Value, expiry: Option<DateTime<Utc>>) -> Result<()> {
        let joined = join_key(key);
        self.data.write().await.insert(joined, Entry { value, expiry });
        Ok(())
    }

    async fn remove(&self, key: &Key) -> Result<()> {
        let joined = join_key(key);
        self.data.write().await.remove(&joined);
        Ok(())
    }

    async fn scan(&self, prefix: &Key) -> Result<BoxStream<'static, Result<ScanEntry>>> {
        let now = Utc::now();
        let data = self.data.read().await;
        let results: Vec<Result<ScanEntry>> = data
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .filter_map(|(joined, entry)| {
                let key = split_key(joined);
                has_prefix(&key, prefix).then(|| Ok((key, entry.value.clone())))
            })
            .collect();
        Ok(Box::pin(stream::iter(results)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use futures::StreamExt;
    use serde_json::json;

    fn k(parts: &[&str]) -> Key {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = InMemoryKvStore::new();
        store.set(&k(&["a", "b"]), json!({"x": 1}), None).await.unwrap();
        let got = store.get(&k(&["a", "b"])).await.unwrap();
        assert_eq!(got, Some(json!({"x": 1})));
    }

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get(&k(&["missing"])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent_and_is_evicted() {
        let store = InMemoryKvStore::new();
        let past = Utc::now() - Duration::seconds(1);
        store.set(&k(&["a"]), json!(1), Some(past)).await.unwrap();
        assert_eq!(store.get(&k(&["a"])).await.unwrap(), None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn remove_deletes_entry() {
        let store = InMemoryKvStore::new();
        store.set(&k(&["a"]), json!(1), None).await.unwrap();
        store.remove(&k(&["a"])).await.unwrap();
        assert_eq!(store.get(&k(&["a"])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_on_absent_key_is_not_an_error() {
        let store = InMemoryKvStore::new();
        assert!(store.remove(&k(&["nope"])).await.is_ok());
    }

    #[tokio::test]
    async fn scan_yields_only_matching_non_expired_prefix() {
        let store = InMemoryKvStore::new();
        store.set(&k(&["job", "1", "status"]), json!("pending"), None).await.unwrap();
        store.set(&k(&["job", "2", "status"]), json!("done"), None).await.unwrap();
        store.set(&k(&["other", "1"]), json!("x"), None).await.unwrap();
        let past = Utc::now() - Duration::seconds(1);
        store.set(&k(&["job", "3", "status"]), json!("expired"), Some(past)).await.unwrap();

        let mut stream = store.scan(&k(&["job"])).await.unwrap();
        let mut seen = Vec::new();
        while let Some(entry) = stream.next().await {
            seen.push(entry.unwrap());
        }
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(key, _)| key[0] == "job"));
    }

    #[tokio::test]
    async fn clear_empties_store() {
        let store = InMemoryKvStore::new();
        store.set(&k(&["a"]), json!(1), None).await.unwrap();
        store.clear().await;
        assert!(store.is_empty().await);
    }
}
