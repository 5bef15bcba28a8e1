//! Mapping of sqlx failures onto [`AuthError`].

use gymstew_core::AuthError;

/// PostgreSQL SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE class for integrity constraint violations (foreign key, unique,
/// not-null, check).
const INTEGRITY_CONSTRAINT_CLASS: &str = "23";

/// Classify a sqlx error for callers of the store traits.
///
/// - Row-shape problems (missing column, undecodable value) map to
///   [`AuthError::MalformedRecord`].
/// - Integrity constraint violations (SQLSTATE class `23`) map to
///   [`AuthError::IntegrityViolation`]; the same write fails on every retry.
/// - Everything else (connection loss, pool timeout, server errors) maps to
///   [`AuthError::StoreUnavailable`].
pub fn classify_sqlx_error(err: sqlx::Error) -> AuthError {
    match err {
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref().is_some_and(is_integrity_violation) =>
        {
            let constraint = db_err.constraint().unwrap_or("unknown");
            tracing::warn!(%constraint, error = %db_err, "Write rejected by constraint");
            AuthError::IntegrityViolation(db_err.to_string())
        }
        sqlx::Error::ColumnNotFound(column) => {
            tracing::error!(%column, "Row is missing a column");
            AuthError::MalformedRecord(format!("missing column {column}"))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            tracing::error!(%index, error = %source, "Failed to decode column");
            AuthError::MalformedRecord(format!("column {index}: {source}"))
        }
        sqlx::Error::Decode(source) => {
            tracing::error!(error = %source, "Failed to decode row");
            AuthError::MalformedRecord(source.to_string())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            AuthError::StoreUnavailable(other.to_string())
        }
    }
}

fn is_integrity_violation(sqlstate: &str) -> bool {
    sqlstate.starts_with(INTEGRITY_CONSTRAINT_CLASS)
}

/// Name of the unique constraint `err` violated, if it is such a violation.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db_err.constraint().unwrap_or("unknown"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pool_timeout_is_unavailable() {
        let err = classify_sqlx_error(sqlx::Error::PoolTimedOut);
        assert_matches!(err, AuthError::StoreUnavailable(_));
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_column_is_malformed() {
        let err = classify_sqlx_error(sqlx::Error::ColumnNotFound("user_id".into()));
        assert_matches!(err, AuthError::MalformedRecord(msg) if msg.contains("user_id"));
    }

    #[test]
    fn integrity_class_covers_foreign_key_and_unique() {
        assert!(is_integrity_violation("23503"));
        assert!(is_integrity_violation(UNIQUE_VIOLATION));
        assert!(is_integrity_violation("23502"));
        assert!(!is_integrity_violation("08006"));
        assert!(!is_integrity_violation("57P01"));
    }

    #[test]
    fn row_not_found_is_not_a_unique_violation() {
        assert_eq!(unique_violation(&sqlx::Error::RowNotFound), None);
    }
}
