//! Persistence contracts for sessions and credentials.
//!
//! The core never talks to a database directly. It consumes these traits,
//! implemented in-process by [`crate::memory`] and against PostgreSQL by the
//! `gymstew-db` crate. Implementations map their own failures to
//! [`AuthError::StoreUnavailable`](crate::error::AuthError::StoreUnavailable),
//! rejected writes to
//! [`AuthError::IntegrityViolation`](crate::error::AuthError::IntegrityViolation),
//! and shape mismatches to
//! [`AuthError::MalformedRecord`](crate::error::AuthError::MalformedRecord).

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AuthResult;
use crate::types::{DbId, SessionId, Timestamp};

/// One active session as persisted by a [`SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

impl SessionRecord {
    /// Whether the record has outlived `ttl` as of `now`.
    pub fn is_expired_at(&self, ttl: chrono::Duration, now: Timestamp) -> bool {
        self.created_at + ttl < now
    }
}

/// A user's stored credential. The raw password never appears here.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub user_id: DbId,
    pub username: String,
    pub password_hash: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Allocate a fresh session id for `user_id` and persist it in one step.
    ///
    /// The returned record is exactly the one inserted.
    async fn create(&self, user_id: DbId) -> AuthResult<SessionRecord>;

    /// Look up a session. `Ok(None)` means no such session.
    async fn read(&self, id: SessionId) -> AuthResult<Option<SessionRecord>>;

    /// Remove a session. Returns whether a record existed.
    async fn delete(&self, id: SessionId) -> AuthResult<bool>;

    /// Remove every session owned by `user_id`. Returns how many existed.
    async fn delete_all_for_user(&self, user_id: DbId) -> AuthResult<u64>;

    /// Remove sessions created before `cutoff`. Returns how many were removed.
    async fn purge_created_before(&self, cutoff: Timestamp) -> AuthResult<u64>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user and return the stored credential.
    ///
    /// Fails with `UsernameTaken` when the username already exists.
    async fn create(&self, username: &str, password_hash: &str) -> AuthResult<Credential>;

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>>;
}
