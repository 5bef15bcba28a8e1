//! Repository for the `sessions` table.

use async_trait::async_trait;
use gymstew_core::store::{SessionRecord, SessionStore};
use gymstew_core::types::{DbId, SessionId, Timestamp};
use gymstew_core::AuthResult;
use sqlx::PgPool;

use crate::error::classify_sqlx_error;
use crate::models::session::SessionRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, created_at";

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    /// The id is generated by the database and returned by the same
    /// statement, so concurrent logins can never observe each other's rows.
    async fn create(&self, user_id: DbId) -> AuthResult<SessionRecord> {
        let query = format!(
            "INSERT INTO sessions (user_id)
             VALUES ($1)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        row.try_into()
    }

    async fn read(&self, id: SessionId) -> AuthResult<Option<SessionRecord>> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(classify_sqlx_error)?
            .map(SessionRecord::try_from)
            .transpose()
    }

    async fn delete(&self, id: SessionId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_for_user(&self, user_id: DbId) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn purge_created_before(&self, cutoff: Timestamp) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(classify_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
