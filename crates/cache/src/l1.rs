//! L1: a bounded, process-local LRU in front of the L2 [`forge_kv::KvStore`].
//!
//! Entries carry their own logical `expiry` (see [`crate::entry::CacheEntry`])
//! plus an LRU insertion timestamp checked against `lru_ttl`. The latter
//! is a staleness bound distinct from the logical expiry: it forces a
//! periodic re-read from L2 even for an entry that hasn't logically
//! expired, which is how cross-process writes to L2 eventually become
//! visible to this process (see spec.md 4.B's note on cross-process
//! visibility, and the session cookie LRU in 4.J which uses the same
//! knob).

use crate::entry::CacheEntry;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

struct Slot {
    entry: CacheEntry,
    inserted_at: Instant,
}

pub struct L1Cache {
    inner: Mutex<LruCache<String, Slot>>,
    ttl: Duration,
}

/// Outcome of an L1 lookup.
pub enum L1Lookup {
    /// A fresh entry (neither logically expired nor L1-stale).
    Fresh(CacheEntry),
    /// The entry's own `expiry` has passed; caller must evict L1 and L2.
    LogicallyExpired,
    /// Present but older than `lru_ttl`; caller should fall through to
    /// L2 without treating this as a logical expiry.
    Stale,
    /// Not present in L1 at all.
    Miss,
}

impl L1Cache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> L1Lookup {
        let now_instant = Instant::now();
        let mut guard = self.inner.lock();
        let Some(slot) = guard.get(key) else {
            return L1Lookup::Miss;
        };

        if slot.entry.is_expired(chrono::Utc::now()) {
            guard.pop(key);
            return L1Lookup::LogicallyExpired;
        }

        if now_instant.duration_since(slot.inserted_at) > self.ttl {
            guard.pop(key);
            return L1Lookup::Stale;
        }

        L1Lookup::Fresh(slot.entry.clone())
    }

    pub fn put(&self, key: String, entry: CacheEntry) {
        self.inner.lock().put(
            key,
            Slot {
                entry,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().pop(key);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}
