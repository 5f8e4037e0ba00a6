//! Password hashing with Argon2id.

use thiserror::Error;

use crate::access_code::{SecretVerifyError, hash_secret, verify_secret};

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a password into a PHC string.
///
/// # Example
///
/// ```
/// use coffer_core::auth::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    hash_secret(password.as_bytes()).map_err(PasswordError::HashError)
}

/// Verifies a password against a stored hash.
///
/// Unlike access-code verification, a malformed stored hash is reported as an
/// error: it means the account row is corrupt, not that the caller guessed wrong.
///
/// ```
/// use coffer_core::auth::{hash_password, verify_password};
///
/// let hash = hash_password("my_password").unwrap();
/// assert!(verify_password("my_password", &hash).unwrap());
/// assert!(!verify_password("wrong_password", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify_secret(password.as_bytes(), hash).map_err(|e| match e {
        SecretVerifyError::Malformed => PasswordError::InvalidHash,
        SecretVerifyError::Hasher(reason) => PasswordError::VerifyError(reason),
    })
}
