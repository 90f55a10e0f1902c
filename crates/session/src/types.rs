//! Types shared across the session core (spec.md 4.J).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The record returned by the external token issuer on a successful
/// bearer-token verification. `properties` is opaque except for the
/// `id` field the session core reads out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub properties: Value,
}

/// The minimal user record the session core needs to build an
/// [`AuthContext`]. A real deployment's user store carries far more;
/// this crate only needs enough to answer "who is this".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Built by both entry points (spec.md 4.J); `session_id` is the
/// literal `"token-session"` for bearer auth, or the cookie value for
/// cookie auth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user: User,
    pub session_id: String,
}

/// What's actually persisted under `session:<id>` (spec.md 6.3):
/// the subject and which provider authenticated it, independent of how
/// long the record itself lives in the cache (tracked via the cache
/// entry's own expiry).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub subject: Subject,
    pub provider: String,
}
