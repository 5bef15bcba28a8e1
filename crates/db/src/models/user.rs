//! User row model.

use gymstew_core::store::Credential;
use gymstew_core::types::{DbId, Timestamp};
use gymstew_core::AuthError;
use sqlx::FromRow;

/// A row from the `users` table.
///
/// Contains the password hash -- never log or serialize it.
#[derive(Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl std::fmt::Debug for UserRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRow")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

impl TryFrom<UserRow> for Credential {
    type Error = AuthError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        if row.username.is_empty() {
            return Err(AuthError::MalformedRecord(format!(
                "user {} has an empty username",
                row.id
            )));
        }
        // Hashes are stored in PHC format, which always starts with `$`.
        if !row.password_hash.starts_with('$') {
            return Err(AuthError::MalformedRecord(format!(
                "user {} has a password hash in an unknown format",
                row.id
            )));
        }
        Ok(Credential {
            user_id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        })
    }
}
