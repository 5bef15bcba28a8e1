//! In-process store implementations.
//!
//! Suitable for tests and single-process deployments. State is lost on
//! restart, so every session ends with the process.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{AuthError, AuthResult};
use crate::store::{Credential, SessionRecord, SessionStore, UserStore};
use crate::types::{DbId, SessionId, Timestamp};

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<SessionId, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Insert a record verbatim, e.g. one backdated for expiry tests.
    pub fn insert(&self, record: SessionRecord) {
        self.sessions.insert(record.id, record);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: DbId) -> AuthResult<SessionRecord> {
        loop {
            let id = SessionId::new();
            if let Entry::Vacant(slot) = self.sessions.entry(id) {
                let record = SessionRecord {
                    id,
                    user_id,
                    created_at: Utc::now(),
                };
                slot.insert(record.clone());
                return Ok(record);
            }
        }
    }

    async fn read(&self, id: SessionId) -> AuthResult<Option<SessionRecord>> {
        Ok(self.sessions.get(&id).map(|r| r.value().clone()))
    }

    async fn delete(&self, id: SessionId) -> AuthResult<bool> {
        Ok(self.sessions.remove(&id).is_some())
    }

    async fn delete_all_for_user(&self, user_id: DbId) -> AuthResult<u64> {
        let mut removed = 0;
        self.sessions.retain(|_, record| {
            let owned = record.user_id == user_id;
            if owned {
                removed += 1;
            }
            !owned
        });
        Ok(removed)
    }

    async fn purge_created_before(&self, cutoff: Timestamp) -> AuthResult<u64> {
        let mut removed = 0;
        self.sessions.retain(|_, record| {
            let stale = record.created_at < cutoff;
            if stale {
                removed += 1;
            }
            !stale
        });
        Ok(removed)
    }
}

#[derive(Debug)]
pub struct MemoryUserStore {
    users: DashMap<String, Credential>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> AuthResult<Credential> {
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AuthError::UsernameTaken(username.to_string())),
            Entry::Vacant(slot) => {
                let credential = Credential {
                    user_id: self.next_id.fetch_add(1, Ordering::Relaxed),
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                };
                slot.insert(credential.clone());
                Ok(credential)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>> {
        Ok(self.users.get(username).map(|c| c.value().clone()))
    }
}
