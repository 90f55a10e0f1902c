//! `forge-kv` — component (A): a namespaced key/value store abstraction
//! with optional absolute expiry and prefix scan.
//!
//! [`KvStore`] is the seam every higher layer (the write-through cache,
//! the checkpointer, session storage) builds on. [`InMemoryKvStore`] is
//! the process-local reference implementation; a production deployment
//! swaps in an external-store-backed implementation of the same trait
//! without touching any caller.

pub mod error;
pub mod key;
pub mod memory;
pub mod store;

pub use error::{KvError, Result};
pub use key::{has_prefix, join_key, split_key};
pub use memory::InMemoryKvStore;
pub use store::{Key, KvStore, ScanEntry};
