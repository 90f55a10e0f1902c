//! [`SessionCore`] (spec.md 4.J): the two authentication entry points —
//! bearer token and session cookie — over [`forge_cache::WriteThroughCache`],
//! the same L1 LRU-over-L2-store code path the cache component itself
//! documents as shared with session storage.

use crate::collaborators::{TokenIssuer, UserStore};
use crate::error::{Result, SessionError};
use crate::types::{AuthContext, SessionRecord, Subject};
use chrono::{DateTime, Duration, Utc};
use forge_cache::WriteThroughCache;
use forge_kv::Key;
use std::sync::Arc;
use tracing::warn;

/// Default TTL for a stored session (spec.md 4.J "`storeSession`...
/// writes `session:<id>` with a 24 h default TTL").
pub const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;

fn session_key(session_id: &str) -> Key {
    vec!["session".to_string(), session_id.to_string()]
}

pub struct SessionCore {
    cache: Arc<WriteThroughCache>,
    issuer: Arc<dyn TokenIssuer>,
    users: Arc<dyn UserStore>,
}

impl SessionCore {
    pub fn new(cache: Arc<WriteThroughCache>, issuer: Arc<dyn TokenIssuer>, users: Arc<dyn UserStore>) -> Self {
        Self { cache, issuer, users }
    }

    /// Bearer-token entry point (spec.md 4.J): extract, verify, parse
    /// `subject.properties.id`, reject non-positive, look up the user.
    pub async fn authenticate_bearer(&self, authorization_header: &str) -> Result<AuthContext> {
        let token = authorization_header
            .strip_prefix("Bearer ")
            .ok_or(SessionError::MissingBearer)?;

        let subject = self.issuer.verify(token).await?;
        let user_id = parse_subject_id(&subject)?;

        let user = self
            .users
            .get_user(&user_id)
            .await?
            .ok_or_else(|| SessionError::UnknownUser(user_id.clone()))?;

        Ok(AuthContext {
            user,
            session_id: "token-session".to_string(),
        })
    }

    /// Session-cookie entry point (spec.md 4.J). `WriteThroughCache::get`
    /// already implements the "present-but-expired, delete and return
    /// none" rule on its own (its L1 lookup evicts on staleness and its
    /// L2 read evicts on a server-side-expired entry), so this method
    /// only has to hydrate the `AuthContext` on a hit.
    pub async fn authenticate_cookie(&self, cookie_value: &str) -> Result<Option<AuthContext>> {
        let Some(raw) = self.cache.get(&session_key(cookie_value)).await? else {
            return Ok(None);
        };

        let record: SessionRecord = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "session record did not deserialize, treating as absent");
                return Ok(None);
            }
        };

        let user_id = parse_subject_id(&record.subject)?;
        let Some(user) = self.users.get_user(&user_id).await? else {
            return Ok(None);
        };

        Ok(Some(AuthContext {
            user,
            session_id: cookie_value.to_string(),
        }))
    }

    /// `storeSession(sessionId, subject, provider, expiresAt?)`.
    pub async fn store_session(
        &self,
        session_id: &str,
        subject: Subject,
        provider: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let record = SessionRecord {
            subject,
            provider: provider.into(),
        };
        let expires_at =
            expires_at.unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_SESSION_TTL_SECS));
        self.cache
            .set(
                &session_key(session_id),
                serde_json::to_value(&record).map_err(|e| SessionError::Other(e.to_string()))?,
                Some(expires_at),
            )
            .await?;
        Ok(())
    }

    /// `deleteSession`: evicts both tiers (handled by
    /// `WriteThroughCache::remove`).
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.cache.remove(&session_key(session_id)).await?;
        Ok(())
    }
}

fn parse_subject_id(subject: &Subject) -> Result<String> {
    let id = subject
        .properties
        .get("id")
        .ok_or(SessionError::InvalidSubjectId)?;

    let as_int = if let Some(n) = id.as_i64() {
        n
    } else if let Some(s) = id.as_str() {
        s.parse::<i64>().map_err(|_| SessionError::InvalidSubjectId)?
    } else {
        return Err(SessionError::InvalidSubjectId);
    };

    if as_int <= 0 {
        return Err(SessionError::InvalidSubjectId);
    }

    Ok(as_int.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{FakeTokenIssuer, InMemoryUserStore};
    use crate::types::User;
    use forge_cache::CacheConfig;
    use forge_kv::InMemoryKvStore;
    use serde_json::json;
    use std::collections::HashMap;

    fn core(tokens: HashMap<String, Subject>, users: Vec<User>) -> SessionCore {
        let kv: Arc<dyn forge_kv::KvStore> = Arc::new(InMemoryKvStore::new());
        let cache = Arc::new(WriteThroughCache::new(
            kv,
            CacheConfig {
                key_prefix: "session-test".to_string(),
                lru_max: 1000,
                lru_ttl: std::time::Duration::from_secs(300),
            },
        ));
        SessionCore::new(
            cache,
            Arc::new(FakeTokenIssuer::new(tokens)),
            Arc::new(InMemoryUserStore::new(users)),
        )
    }

    fn subject(id: i64) -> Subject {
        Subject {
            properties: json!({ "id": id }),
        }
    }

    #[tokio::test]
    async fn bearer_token_builds_an_auth_context_for_a_known_user() {
        let mut tokens = HashMap::new();
        tokens.insert("good-token".to_string(), subject(7));
        let users = vec![User { id: "7".to_string(), name: Some("alice".to_string()), email: None }];
        let core = core(tokens, users);

        let ctx = core.authenticate_bearer("Bearer good-token").await.unwrap();
        assert_eq!(ctx.user.id, "7");
        assert_eq!(ctx.session_id, "token-session");
    }

    #[tokio::test]
    async fn bearer_header_without_bearer_prefix_is_rejected() {
        let core = core(HashMap::new(), Vec::new());
        let err = core.authenticate_bearer("Basic abc").await.unwrap_err();
        assert!(matches!(err, SessionError::MissingBearer));
    }

    #[tokio::test]
    async fn non_positive_subject_id_is_rejected() {
        let mut tokens = HashMap::new();
        tokens.insert("zero-token".to_string(), subject(0));
        let core = core(tokens, Vec::new());
        let err = core.authenticate_bearer("Bearer zero-token").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidSubjectId));
    }

    #[tokio::test]
    async fn store_then_authenticate_cookie_round_trips() {
        let users = vec![User { id: "3".to_string(), name: None, email: None }];
        let core = core(HashMap::new(), users);

        core.store_session("cookie-abc", subject(3), "local", None)
            .await
            .unwrap();

        let ctx = core.authenticate_cookie("cookie-abc").await.unwrap().unwrap();
        assert_eq!(ctx.user.id, "3");
        assert_eq!(ctx.session_id, "cookie-abc");
    }

    #[tokio::test]
    async fn expired_cookie_session_reads_as_none() {
        let users = vec![User { id: "3".to_string(), name: None, email: None }];
        let core = core(HashMap::new(), users);

        let past = Utc::now() - Duration::seconds(1);
        core.store_session("cookie-expired", subject(3), "local", Some(past))
            .await
            .unwrap();

        let result = core.authenticate_cookie("cookie-expired").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn unknown_cookie_reads_as_none() {
        let core = core(HashMap::new(), Vec::new());
        let result = core.authenticate_cookie("no-such-cookie").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_session_makes_a_previously_valid_cookie_read_as_none() {
        let users = vec![User { id: "3".to_string(), name: None, email: None }];
        let core = core(HashMap::new(), users);

        core.store_session("cookie-xyz", subject(3), "local", None)
            .await
            .unwrap();
        assert!(core.authenticate_cookie("cookie-xyz").await.unwrap().is_some());

        core.delete_session("cookie-xyz").await.unwrap();
        assert!(core.authenticate_cookie("cookie-xyz").await.unwrap().is_none());
    }
}
