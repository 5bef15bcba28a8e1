//! Row structs and their typed conversion into core records.
//!
//! Each submodule contains a `FromRow` struct matching the table and a
//! `TryFrom` into the corresponding `gymstew-core` type. The conversion is
//! where row shape is checked; it fails with `AuthError::MalformedRecord`.

pub mod session;
pub mod user;
