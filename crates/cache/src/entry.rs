//! [`CacheEntry`] — the record stored at both cache tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A cached value with an optional absolute expiry.
///
/// L1 wraps this with an LRU insertion timestamp (see
/// [`crate::l1::L1Cache`]); L2 stores it as-is via [`forge_kv::KvStore`],
/// which enforces `expiry` itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub value: Value,
    pub expiry: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn new(value: Value, expiry: Option<DateTime<Utc>>) -> Self {
        Self { value, expiry }
    }

    /// True when `expiry` is set and has passed as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|e| e <= now)
    }
}
