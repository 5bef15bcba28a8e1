//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use gymstew_core::memory::MemorySessionStore;
use gymstew_core::{AuthConfig, SessionManager};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Session lifetime used by [`test_config`].
pub fn test_ttl() -> Duration {
    Duration::hours(12)
}

/// Valid configuration with the cheapest hashing parameters.
pub fn test_config() -> AuthConfig {
    AuthConfig::new(TEST_SECRET, 1, 256, test_ttl()).expect("test config should be valid")
}

pub fn memory_manager() -> SessionManager<MemorySessionStore> {
    SessionManager::new(&test_config(), Arc::new(MemorySessionStore::new()))
}

/// Turn a `Set-Cookie` value into the `Cookie` header a browser would send back.
pub fn cookie_header(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .expect("split always yields one item")
        .to_string()
}
