//! Account password hashing.
//!
//! Accounts are owned by the surrounding account subsystem; custody only reads
//! owner existence. The hashing lives here so sign-up and sign-in use the same
//! Argon2id scheme as access codes.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
