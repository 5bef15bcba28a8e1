//! Repository layer.
//!
//! Each repository wraps a cloned `PgPool` and implements one of the
//! `gymstew-core` store traits.

pub mod session_repo;
pub mod user_repo;

pub use session_repo::PgSessionStore;
pub use user_repo::PgUserStore;
