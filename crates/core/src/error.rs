/// Why a session cookie did not yield a session id.
///
/// Callers treat every variant as "no session"; the distinction exists for
/// logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    #[error("session cookie absent")]
    Absent,

    #[error("session cookie signature invalid")]
    Tampered,

    #[error("session cookie expired")]
    Expired,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or out-of-range configuration. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored password hash is not in the expected PHC format.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    #[error(transparent)]
    Cookie(#[from] CookieError),

    /// The persistence layer could not be reached. Retryable.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// A persisted row did not match the expected shape.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The store refused a write that breaks a data constraint, e.g. a
    /// session for a user that does not exist. Retrying cannot help.
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Hashing failed at runtime, including a panicked or cancelled
    /// blocking task.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl AuthError {
    /// Whether the same call may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable(_))
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
