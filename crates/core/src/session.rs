//! Session lifecycle: login, per-request authentication, logout.
//!
//! [`SessionManager`] is the only path by which request-handling code learns
//! who is making a request. It holds no mutable state of its own; everything
//! mutable lives in the [`SessionStore`], so one manager can be shared by any
//! number of concurrent requests and any number of process replicas.
//!
//! Session states: created by [`login`](SessionManager::login), active while
//! the record exists and is younger than the TTL, then either destroyed by
//! [`logout`](SessionManager::logout) / [`revoke_all`](SessionManager::revoke_all)
//! or expired. Expiry is applied lazily on read.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::config::AuthConfig;
use crate::cookie::{session_cookie_value, CookieCodec};
use crate::error::{AuthResult, CookieError};
use crate::store::SessionStore;
use crate::types::{DbId, SessionId, Timestamp};

pub struct SessionManager<S: SessionStore> {
    store: Arc<S>,
    cookies: CookieCodec,
    ttl: Duration,
}

impl<S: SessionStore> Clone for SessionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cookies: self.cookies.clone(),
            ttl: self.ttl,
        }
    }
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(config: &AuthConfig, store: Arc<S>) -> Self {
        Self {
            store,
            cookies: CookieCodec::new(config),
            ttl: config.session_ttl(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cookies(&self) -> &CookieCodec {
        &self.cookies
    }

    /// Resolve the user behind a `Cookie` request header.
    ///
    /// Returns `Ok(None)` for every flavour of "not logged in": no cookie, a
    /// forged or expired cookie, or a session that no longer exists. Errors
    /// are reserved for infrastructure failures the caller should surface
    /// as a 5xx rather than a login redirect.
    pub async fn authenticate(&self, cookie_header: Option<&str>) -> AuthResult<Option<DbId>> {
        self.authenticate_at(cookie_header, Utc::now()).await
    }

    pub async fn authenticate_at(
        &self,
        cookie_header: Option<&str>,
        now: Timestamp,
    ) -> AuthResult<Option<DbId>> {
        let id = match self.session_id_from_header(cookie_header, now) {
            Ok(id) => id,
            Err(reason) => {
                tracing::debug!(%reason, "Session cookie rejected");
                return Ok(None);
            }
        };

        let Some(record) = self.store.read(id).await? else {
            tracing::debug!(session_id = %id, "Session not found");
            return Ok(None);
        };

        if record.is_expired_at(self.ttl, now) {
            tracing::debug!(session_id = %id, user_id = record.user_id, "Session expired");
            if let Err(e) = self.store.delete(id).await {
                tracing::warn!(session_id = %id, error = %e, "Failed to delete expired session");
            }
            return Ok(None);
        }

        Ok(Some(record.user_id))
    }

    /// Start a session for `user_id` and return the `Set-Cookie` value.
    pub async fn login(&self, user_id: DbId) -> AuthResult<String> {
        let record = self.store.create(user_id).await?;
        tracing::info!(user_id, "Session created");
        let value = self.cookies.encode_at(record.id, record.created_at);
        Ok(self.cookies.set_cookie(&value))
    }

    /// End the session named by a `Cookie` request header.
    ///
    /// Always returns a `Set-Cookie` value that clears the cookie, even when
    /// the cookie is missing or forged or the store cannot be reached, so
    /// logging out is idempotent from the client's point of view.
    pub async fn logout(&self, cookie_header: Option<&str>) -> String {
        let recovered = session_cookie_value(cookie_header)
            .ok_or(CookieError::Absent)
            .and_then(|value| self.cookies.decode_ignoring_expiry(value));

        match recovered {
            Ok(id) => match self.store.delete(id).await {
                Ok(true) => tracing::info!(session_id = %id, "Session destroyed"),
                Ok(false) => tracing::debug!(session_id = %id, "Session already gone"),
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "Failed to delete session on logout")
                }
            },
            Err(reason) => tracing::debug!(%reason, "Logout without a usable session cookie"),
        }

        self.cookies.clear_cookie()
    }

    /// Destroy every session of `user_id` (logout everywhere, admin revoke).
    pub async fn revoke_all(&self, user_id: DbId) -> AuthResult<u64> {
        let revoked = self.store.delete_all_for_user(user_id).await?;
        tracing::info!(user_id, revoked, "Revoked all sessions");
        Ok(revoked)
    }

    /// Delete every record older than the TTL.
    ///
    /// Optional: expired records are also removed lazily when read.
    pub async fn purge_expired(&self) -> AuthResult<u64> {
        let purged = self.store.purge_created_before(Utc::now() - self.ttl).await?;
        if purged > 0 {
            tracing::info!(purged, "Purged expired sessions");
        }
        Ok(purged)
    }

    fn session_id_from_header(
        &self,
        cookie_header: Option<&str>,
        now: Timestamp,
    ) -> Result<SessionId, CookieError> {
        let value = session_cookie_value(cookie_header).ok_or(CookieError::Absent)?;
        self.cookies.decode_at(value, now)
    }
}
