//! `forge-session` — component (J): the session core. Bearer-token and
//! session-cookie dual entry points over `forge-cache`'s write-through
//! store, plus `storeSession`/`deleteSession`.

pub mod collaborators;
pub mod core;
pub mod error;
pub mod types;

pub use collaborators::{FakeTokenIssuer, InMemoryUserStore, TokenIssuer, UserStore};
pub use core::{SessionCore, DEFAULT_SESSION_TTL_SECS};
pub use error::{Result, SessionError};
pub use types::{AuthContext, SessionRecord, Subject, User};
