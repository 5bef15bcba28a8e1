//! Session row model.

use gymstew_core::store::SessionRecord;
use gymstew_core::types::{DbId, SessionId, Timestamp};
use gymstew_core::AuthError;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = AuthError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        if row.id.is_nil() {
            return Err(AuthError::MalformedRecord("session id is nil".into()));
        }
        if row.user_id <= 0 {
            return Err(AuthError::MalformedRecord(format!(
                "session {} has invalid user_id {}",
                row.id, row.user_id
            )));
        }
        Ok(SessionRecord {
            id: SessionId(row.id),
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}
