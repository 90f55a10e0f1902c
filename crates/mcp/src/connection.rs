//! The connection registry (spec.md 4.I "Connection lifecycle", 5 "The
//! MCP connection registry is a singleton; writes... are brief, reads...
//! are frequent and lock-free-friendly"). Modeled directly on the
//! teacher's `ConnectionPool` (`orchestrator::api::ws::pool`): a
//! `DashMap` keyed by connection id, `connect`/`disconnect` writes,
//! cheap reads, and last-activity tracking for stale-connection
//! cleanup.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Per-connection state machine position (spec.md 4.I "MCP state
/// machine"). `Error` is a separate terminal, not reachable from
/// `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    ProcessingRequest,
    HandlingToolCall,
    SendingResponse,
    Completed,
    Error,
}

/// Registry entry for one open connection. `client_info` and
/// `is_initialized` are set by the `initialize` handler.
pub struct ConnectionEntry {
    pub connection_id: String,
    pub connected_at: i64,
    pub last_activity: AtomicI64,
    pub is_initialized: std::sync::atomic::AtomicBool,
    pub client_info: std::sync::Mutex<Option<Value>>,
}

impl ConnectionEntry {
    fn new(connection_id: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            connection_id,
            connected_at: now,
            last_activity: AtomicI64::new(now),
            is_initialized: std::sync::atomic::AtomicBool::new(false),
            client_info: std::sync::Mutex::new(None),
        }
    }

    pub fn touch(&self) {
        self.last_activity
            .store(chrono::Utc::now().timestamp(), Ordering::Relaxed);
    }
}

/// The connection registry. A singleton in the running server; tests
/// construct their own instance freely.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<String, Arc<ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `onOpen`: register `(connectionId, socket)` (spec.md 4.I). The
    /// socket itself is owned by the transport layer above this crate;
    /// the registry only tracks bookkeeping needed to answer `get`/
    /// `getAll` and to detect staleness.
    pub fn register(&self, connection_id: impl Into<String>) -> Arc<ConnectionEntry> {
        let connection_id = connection_id.into();
        let entry = Arc::new(ConnectionEntry::new(connection_id.clone()));
        self.connections.insert(connection_id, entry.clone());
        entry
    }

    /// `onClose` / `onError`: deregister.
    pub fn deregister(&self, connection_id: &str) -> Option<Arc<ConnectionEntry>> {
        self.connections.remove(connection_id).map(|(_, e)| e)
    }

    pub fn get(&self, connection_id: &str) -> Option<Arc<ConnectionEntry>> {
        self.connections.get(connection_id).map(|e| e.clone())
    }

    pub fn get_all(&self) -> Vec<Arc<ConnectionEntry>> {
        self.connections.iter().map(|e| e.clone()).collect()
    }

    pub fn active_connections(&self) -> usize {
        self.connections.len()
    }

    /// Remove connections with no activity for `timeout_secs`, returning
    /// the removed ids.
    pub fn cleanup_stale(&self, timeout_secs: i64) -> Vec<String> {
        let now = chrono::Utc::now().timestamp();
        let mut removed = Vec::new();
        self.connections.retain(|id, entry| {
            let idle = now - entry.last_activity.load(Ordering::Relaxed);
            if idle > timeout_secs {
                removed.push(id.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_deregister_round_trip() {
        let registry = ConnectionRegistry::new();
        registry.register("conn-1");
        assert_eq!(registry.active_connections(), 1);
        assert!(registry.get("conn-1").is_some());

        registry.deregister("conn-1");
        assert_eq!(registry.active_connections(), 0);
        assert!(registry.get("conn-1").is_none());
    }

    #[test]
    fn cleanup_stale_removes_only_inactive_connections() {
        let registry = ConnectionRegistry::new();
        let stale = registry.register("stale");
        registry.register("fresh");

        stale.last_activity.store(0, Ordering::Relaxed);
        let removed = registry.cleanup_stale(60);

        assert_eq!(removed, vec!["stale".to_string()]);
        assert_eq!(registry.active_connections(), 1);
        assert!(registry.get("fresh").is_some());
    }
}
