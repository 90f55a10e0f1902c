//! [`WriteThroughCache`] — component (B): L1 bounded LRU in front of an
//! L2 [`forge_kv::KvStore`], used as the single code path for session
//! storage (4.J) and OpenAuth-style key/value storage (6.3).

use crate::entry::CacheEntry;
use crate::error::Result;
use crate::l1::{L1Cache, L1Lookup};
use chrono::{DateTime, Utc};
use forge_kv::{Key, KvStore};
use futures::stream::{self, BoxStream};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Construction parameters for a [`WriteThroughCache`].
pub struct CacheConfig {
    /// Namespace prefix; every logical key is stored under it in L2.
    pub key_prefix: String,
    /// Maximum number of entries held in L1.
    pub lru_max: usize,
    /// Staleness bound for L1 entries (see [`crate::l1`]).
    pub lru_ttl: Duration,
}

pub struct WriteThroughCache {
    store: Arc<dyn KvStore>,
    config: CacheConfig,
    l1: L1Cache,
}

impl WriteThroughCache {
    pub fn new(store: Arc<dyn KvStore>, config: CacheConfig) -> Self {
        let l1 = L1Cache::new(config.lru_max, config.lru_ttl);
        Self { store, config, l1 }
    }

    fn l2_key(&self, logical: &Key) -> Key {
        let mut full = vec![self.config.key_prefix.clone()];
        full.extend(logical.iter().cloned());
        full
    }

    fn l1_key(&self, logical: &Key) -> String {
        forge_kv::join_key(logical)
    }

    /// `get(K)`: L1 hit-and-fresh returns immediately; L1 hit-but-expired
    /// evicts both tiers; L1 miss (or L1-stale) falls through to L2.
    pub async fn get(&self, key: &Key) -> Result<Option<Value>> {
        let l1_key = self.l1_key(key);

        match self.l1.get(&l1_key) {
            L1Lookup::Fresh(entry) => return Ok(Some(entry.value)),
            L1Lookup::LogicallyExpired => {
                if let Err(e) = self.store.remove(&self.l2_key(key)).await {
                    warn!(error = %e, "best-effort L2 eviction of expired entry failed");
                }
                return Ok(None);
            }
            L1Lookup::Stale | L1Lookup::Miss => {}
        }

        let l2_key = self.l2_key(key);
        let raw = self.store.get(&l2_key).await?;
        let Some(raw) = raw else { return Ok(None) };

        let entry: CacheEntry = serde_json::from_value(raw).map_err(forge_kv::KvError::from)?;
        if entry.is_expired(Utc::now()) {
            if let Err(e) = self.store.remove(&l2_key).await {
                warn!(error = %e, "best-effort L2 eviction of expired entry failed");
            }
            return Ok(None);
        }

        self.l1.put(l1_key, entry.clone());
        Ok(Some(entry.value))
    }

    /// `set(K, v, expiry?)`: write L1 and L2 with the same expiry.
    pub async fn set(&self, key: &Key, value: Value, expiry: Option<DateTime<Utc>>) -> Result<()> {
        let entry = CacheEntry::new(value, expiry);
        let l2_value = serde_json::to_value(&entry).map_err(forge_kv::KvError::from)?;
        self.store.set(&self.l2_key(key), l2_value, expiry).await?;
        self.l1.put(self.l1_key(key), entry);
        Ok(())
    }

    /// `remove(K)`: evict L1 and L2.
    pub async fn remove(&self, key: &Key) -> Result<()> {
        self.l1.remove(&self.l1_key(key));
        self.store.remove(&self.l2_key(key)).await?;
        Ok(())
    }

    /// `scan(prefix)`: iterate L2 (paged/non-blocking per the `KvStore`
    /// contract) and yield `(logical_key, value)` for non-expired entries.
    pub async fn scan(&self, prefix: &Key) -> Result<BoxStream<'static, Result<(Key, Value)>>> {
        let l2_prefix = self.l2_key(prefix);
        let prefix_len = self.config.key_prefix.len();
        let mut inner = self.store.scan(&l2_prefix).await?;

        let mut out = Vec::new();
        use futures::StreamExt;
        while let Some(item) = inner.next().await {
            let (full_key, raw) = item?;
            let logical: Key = full_key.into_iter().skip(1).collect();
            let entry: CacheEntry = match serde_json::from_value(raw) {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping entry with unexpected shape during scan");
                    continue;
                }
            };
            if entry.is_expired(Utc::now()) {
                continue;
            }
            out.push(Ok((logical, entry.value)));
        }
        let _ = prefix_len;
        Ok(Box::pin(stream::iter(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_kv::InMemoryKvStore;
    use serde_json::json;

    fn k(parts: &[&str]) -> Key {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn cache() -> WriteThroughCache {
        WriteThroughCache::new(
            Arc::new(InMemoryKvStore::new()),
            CacheConfig {
                key_prefix: "test".into(),
                lru_max: 100,
                lru_ttl: Duration::from_secs(300),
            },
        )
    }

    #[tokio::test]
    async fn set_then_get_round_trips_within_process() {
        let cache = cache();
        cache.set(&k(&["a"]), json!({"v": 1}), None).await.unwrap();
        assert_eq!(cache.get(&k(&["a"])).await.unwrap(), Some(json!({"v": 1})));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let cache = cache();
        let past = Utc::now() - chrono::Duration::seconds(1);
        cache.set(&k(&["a"]), json!(1), Some(past)).await.unwrap();
        assert_eq!(cache.get(&k(&["a"])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn remove_clears_both_tiers() {
        let cache = cache();
        cache.set(&k(&["a"]), json!(1), None).await.unwrap();
        cache.remove(&k(&["a"])).await.unwrap();
        assert_eq!(cache.get(&k(&["a"])).await.unwrap(), None);
    }

    #[tokio::test]
    async fn scan_returns_matching_logical_keys() {
        let cache = cache();
        cache.set(&k(&["job", "1"]), json!("a"), None).await.unwrap();
        cache.set(&k(&["job", "2"]), json!("b"), None).await.unwrap();
        cache.set(&k(&["other"]), json!("c"), None).await.unwrap();

        use futures::StreamExt;
        let mut stream = cache.scan(&k(&["job"])).await.unwrap();
        let mut results = Vec::new();
        while let Some(r) = stream.next().await {
            results.push(r.unwrap());
        }
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn l1_hit_does_not_require_l2_roundtrip_for_value() {
        let cache = cache();
        cache.set(&k(&["a"]), json!(42), None).await.unwrap();
        // Remove straight from L2 underneath the cache to prove L1 serves it.
        cache.store.remove(&cache.l2_key(&k(&["a"]))).await.unwrap();
        assert_eq!(cache.get(&k(&["a"])).await.unwrap(), Some(json!(42)));
    }
}
