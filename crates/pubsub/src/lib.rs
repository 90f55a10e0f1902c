//! `forge-pubsub` — component (C): topic and pattern pub/sub bus.

pub mod bus;
pub mod error;
pub mod pattern;

pub use bus::PubSub;
pub use error::{PubSubError, Result};
