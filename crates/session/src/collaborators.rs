//! External collaborators the session core depends on but does not own
//! (spec.md §1's "external issuer" and user directory), seamed off the
//! same way [`forge_llm::ChatModel`] and
//! [`forge_workflows::GraphStore`](../../workflows/src/store.rs) are.

use crate::error::Result;
use crate::types::{Subject, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Verifies a bearer token against the external token issuer.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Subject>;
}

/// Looks up the user record a verified subject or stored session
/// refers to.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;
}

/// A fixed-catalogue [`TokenIssuer`] for tests: any token present in the
/// map verifies to its mapped subject; anything else is rejected.
#[derive(Default)]
pub struct FakeTokenIssuer {
    tokens: HashMap<String, Subject>,
}

impl FakeTokenIssuer {
    pub fn new(tokens: HashMap<String, Subject>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenIssuer for FakeTokenIssuer {
    async fn verify(&self, token: &str) -> Result<Subject> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| crate::error::SessionError::InvalidToken(token.to_string()))
    }
}

/// A fixed-catalogue [`UserStore`] for tests.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new(users: Vec<User>) -> Self {
        let map = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: Mutex::new(map),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }
}
