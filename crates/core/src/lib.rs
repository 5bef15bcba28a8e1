//! Session and credential management for gymstew.
//!
//! - [`password`] -- Argon2id credential hashing and verification.
//! - [`store`] -- Session and user persistence contracts; [`memory`] implements them in-process.
//! - [`cookie`] -- Signed, time-bounded session cookie transport.
//! - [`session`] -- [`SessionManager`](session::SessionManager): login, authenticate, logout.
//! - [`accounts`] -- Registration and password login.
//!
//! Everything is constructed explicitly from one [`AuthConfig`](config::AuthConfig)
//! at startup and shared read-only afterwards.

pub mod accounts;
pub mod config;
pub mod cookie;
pub mod error;
pub mod memory;
pub mod password;
pub mod session;
pub mod signing;
pub mod store;
pub mod types;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult, CookieError};
pub use session::SessionManager;
