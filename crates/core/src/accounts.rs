//! Registration and password login on top of the session manager.

use std::sync::Arc;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::password::{validate_password_strength, CredentialHasher, MIN_PASSWORD_LENGTH};
use crate::session::SessionManager;
use crate::store::{SessionStore, UserStore};
use crate::types::DbId;

/// Input for [`AccountService::register`].
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 64), custom(function = "validate_username"))]
    pub username: String,
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim() != username || username.chars().any(char::is_control) {
        let mut err = ValidationError::new("username");
        err.message =
            Some("Username must not contain surrounding whitespace or control characters".into());
        return Err(err);
    }
    Ok(())
}

/// Outcome of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: DbId,
    /// `Set-Cookie` value for the session the new user is logged into.
    pub set_cookie: String,
}

pub struct AccountService<U: UserStore, S: SessionStore> {
    users: Arc<U>,
    sessions: SessionManager<S>,
    hasher: CredentialHasher,
    /// Verified against when the username is unknown, so both failure paths
    /// cost one hash.
    dummy_hash: String,
}

impl<U: UserStore, S: SessionStore> AccountService<U, S> {
    pub fn new(config: &AuthConfig, users: Arc<U>, sessions: SessionManager<S>) -> AuthResult<Self> {
        let hasher = CredentialHasher::new(config)?;
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            users,
            sessions,
            hasher,
            dummy_hash,
        })
    }

    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    /// Create an account and log it in.
    pub async fn register(&self, input: RegisterRequest) -> AuthResult<Registration> {
        input
            .validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
            .map_err(AuthError::Validation)?;

        let password_hash = self.hasher.hash_blocking(input.password).await?;
        let credential = self.users.create(&input.username, &password_hash).await?;
        tracing::info!(user_id = credential.user_id, "User registered");

        let set_cookie = self.sessions.login(credential.user_id).await?;
        Ok(Registration {
            user_id: credential.user_id,
            set_cookie,
        })
    }

    /// Check a username/password pair and log the user in.
    ///
    /// Unknown usernames and wrong passwords both fail with
    /// [`AuthError::InvalidCredentials`].
    pub async fn sign_in(&self, username: &str, password: &str) -> AuthResult<String> {
        let Some(credential) = self.users.find_by_username(username).await? else {
            self.hasher
                .verify_blocking(password.to_string(), self.dummy_hash.clone())
                .await?;
            tracing::info!("Login rejected: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        let valid = self
            .hasher
            .verify_blocking(password.to_string(), credential.password_hash.clone())
            .await?;
        if !valid {
            tracing::info!(user_id = credential.user_id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if self.hasher.needs_rehash(&credential.password_hash)? {
            tracing::info!(
                user_id = credential.user_id,
                "Stored password hash uses outdated parameters"
            );
        }

        self.sessions.login(credential.user_id).await
    }

    pub async fn current_user(&self, cookie_header: Option<&str>) -> AuthResult<Option<DbId>> {
        self.sessions.authenticate(cookie_header).await
    }

    pub async fn sign_out(&self, cookie_header: Option<&str>) -> String {
        self.sessions.logout(cookie_header).await
    }
}
