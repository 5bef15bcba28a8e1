//! Argon2id password hashing, verification, and strength validation.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashes and verifies passwords with the configured work factor.
///
/// Cheap to clone. Hashing is deliberately slow; async callers should go
/// through [`CredentialHasher::hash_blocking`] and
/// [`CredentialHasher::verify_blocking`] so the work stays off the executor.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let params = Params::new(
            config.hash_memory_kib(),
            config.hash_cost(),
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| AuthError::Config(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password using Argon2id with a random salt.
    ///
    /// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored PHC-formatted Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
    /// The parameters embedded in `hash` are used, not the configured ones,
    /// so hashes made under an older work factor still verify.
    pub fn verify(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = parse(hash)?;
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::MalformedHash(e.to_string())),
        }
    }

    /// Whether `hash` was produced with parameters other than the configured ones.
    pub fn needs_rehash(&self, hash: &str) -> AuthResult<bool> {
        let parsed = parse(hash)?;
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return Ok(true);
        }
        let stored =
            Params::try_from(&parsed).map_err(|e| AuthError::MalformedHash(e.to_string()))?;
        Ok(stored.m_cost() != self.params.m_cost()
            || stored.t_cost() != self.params.t_cost()
            || stored.p_cost() != self.params.p_cost())
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, password: String) -> AuthResult<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(task_failed)?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(&self, password: String, hash: String) -> AuthResult<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(task_failed)?
    }
}

fn task_failed(err: tokio::task::JoinError) -> AuthError {
    tracing::error!(error = %err, "Blocking hash task failed");
    AuthError::Hashing(format!("blocking task failed: {err}"))
}

fn parse(hash: &str) -> AuthResult<PasswordHash<'_>> {
    PasswordHash::new(hash).map_err(|e| AuthError::MalformedHash(e.to_string()))
}

/// Validate that a password meets minimum strength requirements.
///
/// Currently enforces a minimum character length. Returns `Ok(())` when the
/// password is acceptable, or `Err` with a human-readable explanation.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;

    /// Cheap parameters so the suite stays fast.
    fn test_hasher(cost: u32) -> CredentialHasher {
        let config = AuthConfig::new(
            "test-secret-that-is-long-enough-for-hmac",
            cost,
            256,
            Duration::days(1),
        )
        .expect("test config should be valid");
        CredentialHasher::new(&config).expect("hasher should build")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = test_hasher(1);
        let password = "correct-horse-battery-staple";
        let hash = hasher.hash(password).expect("hashing should succeed");

        // The hash must be a valid PHC string starting with the argon2id identifier.
        assert!(
            hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );
        assert!(!hash.contains(password));

        let verified = hasher.verify(password, &hash).expect("verify should succeed");
        assert!(verified, "correct password should verify as true");
    }

    #[test]
    fn test_wrong_password_fails() {
        let hasher = test_hasher(1);
        let hash = hasher.hash("real-password").expect("hashing should succeed");
        let verified = hasher
            .verify("wrong-password", &hash)
            .expect("verify should succeed");
        assert!(!verified, "wrong password should verify as false");
    }

    #[test]
    fn test_salt_is_fresh_per_call() {
        let hasher = test_hasher(1);
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = test_hasher(1);
        assert_matches!(
            hasher.verify("pw", "not-a-phc-string"),
            Err(AuthError::MalformedHash(_))
        );
        assert_matches!(hasher.verify("pw", ""), Err(AuthError::MalformedHash(_)));
    }

    #[test]
    fn test_old_work_factor_still_verifies() {
        let old = test_hasher(1);
        let new = test_hasher(3);
        let hash = old.hash("pw-from-last-year").unwrap();
        assert!(new.verify("pw-from-last-year", &hash).unwrap());
        assert!(new.needs_rehash(&hash).unwrap());
        assert!(!old.needs_rehash(&hash).unwrap());
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hasher = test_hasher(1);
        let hash = hasher.hash_blocking("pw".to_string()).await.unwrap();
        assert!(hasher
            .verify_blocking("pw".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!hasher
            .verify_blocking("nope".to_string(), hash)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_panicked_task_is_hashing_error() {
        let join_err = tokio::task::spawn_blocking(|| panic!("boom"))
            .await
            .unwrap_err();
        let err = task_failed(join_err);
        assert_matches!(err, AuthError::Hashing(_));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_password_too_short() {
        let result = validate_password_strength("short", 12);
        assert!(result.is_err());
        let msg = result.unwrap_err();
        assert!(
            msg.contains("at least 12 characters"),
            "error message should state the minimum length"
        );
    }

    #[test]
    fn test_password_length_counts_characters() {
        // Eight multi-byte characters meet an eight-character minimum.
        assert!(validate_password_strength("ääääääää", 8).is_ok());
        assert!(validate_password_strength("äääääää", 8).is_err());
    }
}
