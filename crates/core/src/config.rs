//! Process-wide authentication settings.
//!
//! An [`AuthConfig`] is built once at startup and shared read-only by the
//! hasher, cookie codec, and session manager. Every constructor validates
//! its input, so holding an `AuthConfig` means the settings are usable.

use std::fmt;

use chrono::Duration;

use crate::error::{AuthError, AuthResult};

/// Minimum signing secret length in bytes (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Default Argon2 time cost (iterations).
pub const DEFAULT_HASH_COST: u32 = 2;

/// Inclusive range accepted for the Argon2 time cost.
pub const HASH_COST_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Default Argon2 memory cost in KiB (19 MiB).
pub const DEFAULT_HASH_MEMORY_KIB: u32 = 19 * 1024;

/// Largest accepted Argon2 memory cost in KiB (1 GiB).
pub const MAX_HASH_MEMORY_KIB: u32 = 1024 * 1024;

/// Default session lifetime in seconds (30 days).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Longest accepted session lifetime in seconds (400 days, the browser cap).
pub const MAX_SESSION_TTL_SECS: i64 = 400 * 24 * 60 * 60;

#[derive(Clone)]
pub struct AuthConfig {
    signing_secret: Vec<u8>,
    previous_secrets: Vec<Vec<u8>>,
    hash_cost: u32,
    hash_memory_kib: u32,
    session_ttl: Duration,
}

impl AuthConfig {
    /// Build a validated configuration.
    pub fn new(
        signing_secret: impl Into<Vec<u8>>,
        hash_cost: u32,
        hash_memory_kib: u32,
        session_ttl: Duration,
    ) -> AuthResult<Self> {
        let signing_secret = signing_secret.into();
        validate_secret("signing secret", &signing_secret)?;

        if !HASH_COST_RANGE.contains(&hash_cost) {
            return Err(AuthError::Config(format!(
                "hash cost {hash_cost} outside {}..={}",
                HASH_COST_RANGE.start(),
                HASH_COST_RANGE.end()
            )));
        }

        if !(argon2::Params::MIN_M_COST..=MAX_HASH_MEMORY_KIB).contains(&hash_memory_kib) {
            return Err(AuthError::Config(format!(
                "hash memory {hash_memory_kib} KiB outside {}..={MAX_HASH_MEMORY_KIB}",
                argon2::Params::MIN_M_COST
            )));
        }

        let ttl_secs = session_ttl.num_seconds();
        if ttl_secs < 1 || ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(AuthError::Config(format!(
                "session TTL {ttl_secs}s outside 1..={MAX_SESSION_TTL_SECS}"
            )));
        }

        Ok(Self {
            signing_secret,
            previous_secrets: Vec::new(),
            hash_cost,
            hash_memory_kib,
            session_ttl,
        })
    }

    /// Accept cookies signed with retired secrets while a rotation rolls out.
    ///
    /// New cookies are always signed with the current secret.
    pub fn with_previous_secrets(mut self, secrets: Vec<Vec<u8>>) -> AuthResult<Self> {
        for secret in &secrets {
            validate_secret("previous signing secret", secret)?;
        }
        self.previous_secrets = secrets;
        Ok(self)
    }

    /// Load configuration from the environment after applying a `.env` file,
    /// if one exists.
    pub fn load() -> AuthResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var                            | Required | Default   |
    /// |------------------------------------|----------|-----------|
    /// | `SESSION_SIGNING_SECRET`           | **yes**  | --        |
    /// | `SESSION_PREVIOUS_SIGNING_SECRETS` | no       | --        |
    /// | `PASSWORD_HASH_COST`               | no       | `2`       |
    /// | `PASSWORD_HASH_MEMORY_KIB`         | no       | `19456`   |
    /// | `SESSION_TTL_SECS`                 | no       | `2592000` |
    ///
    /// `SESSION_PREVIOUS_SIGNING_SECRETS` is comma-separated.
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("SESSION_SIGNING_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::Config("SESSION_SIGNING_SECRET must be set".into()))?;

        let hash_cost = parse_or("PASSWORD_HASH_COST", &lookup, DEFAULT_HASH_COST)?;
        let hash_memory_kib =
            parse_or("PASSWORD_HASH_MEMORY_KIB", &lookup, DEFAULT_HASH_MEMORY_KIB)?;
        let ttl_secs = parse_or("SESSION_TTL_SECS", &lookup, DEFAULT_SESSION_TTL_SECS)?;

        let previous: Vec<Vec<u8>> = lookup("SESSION_PREVIOUS_SIGNING_SECRETS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.as_bytes().to_vec())
            .collect();

        let session_ttl = Duration::try_seconds(ttl_secs)
            .ok_or_else(|| AuthError::Config(format!("SESSION_TTL_SECS {ttl_secs} out of range")))?;

        Self::new(secret.into_bytes(), hash_cost, hash_memory_kib, session_ttl)?
            .with_previous_secrets(previous)
    }

    pub fn signing_secret(&self) -> &[u8] {
        &self.signing_secret
    }

    pub fn previous_secrets(&self) -> &[Vec<u8>] {
        &self.previous_secrets
    }

    /// Argon2 time cost (the work factor).
    pub fn hash_cost(&self) -> u32 {
        self.hash_cost
    }

    pub fn hash_memory_kib(&self) -> u32 {
        self.hash_memory_kib
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret_len", &self.signing_secret.len())
            .field("previous_secrets", &self.previous_secrets.len())
            .field("hash_cost", &self.hash_cost)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("session_ttl_secs", &self.session_ttl.num_seconds())
            .finish()
    }
}

fn validate_secret(what: &str, secret: &[u8]) -> AuthResult<()> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(AuthError::Config(format!(
            "{what} too short: got {} bytes, need at least {MIN_SECRET_LENGTH}",
            secret.len()
        )));
    }
    Ok(())
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> AuthResult<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AuthError::Config(format!("{key} must be a valid number, got {raw:?}"))),
        None => Ok(default),
    }
}
