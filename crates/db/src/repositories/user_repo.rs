//! Repository for the `users` table.

use async_trait::async_trait;
use gymstew_core::store::{Credential, UserStore};
use gymstew_core::{AuthError, AuthResult};
use sqlx::PgPool;

use crate::error::{classify_sqlx_error, unique_violation};
use crate::models::user::UserRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, password_hash, created_at";

/// Unique constraint guarding usernames.
const USERNAME_CONSTRAINT: &str = "uq_users_username";

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> AuthResult<Credential> {
        let query = format!(
            "INSERT INTO users (username, password_hash)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if unique_violation(&e) == Some(USERNAME_CONSTRAINT) {
                    AuthError::UsernameTaken(username.to_string())
                } else {
                    classify_sqlx_error(e)
                }
            })?;
        row.try_into()
    }

    /// Find a user by username (case-sensitive).
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Credential>> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_sqlx_error)?
            .map(Credential::try_from)
            .transpose()
    }
}
