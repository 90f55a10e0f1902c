//! `forge-cache` — component (B): write-through L1 LRU + L2 KV cache.
//!
//! One code path is shared by session storage (4.J), OpenAuth-style
//! storage (6.3), and the job service's result/status caching (4.H).

pub mod cache;
pub mod entry;
pub mod error;
pub mod l1;

pub use cache::{CacheConfig, WriteThroughCache};
pub use entry::CacheEntry;
pub use error::{CacheError, Result};
