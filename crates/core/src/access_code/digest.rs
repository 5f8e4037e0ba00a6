//! Argon2id PHC-string digests shared by access codes and account passwords.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Why a digest could not be checked at all (as opposed to a plain mismatch).
#[derive(Debug)]
pub(crate) enum SecretVerifyError {
    /// The stored string is not a PHC digest.
    Malformed,
    /// The hasher failed for another reason.
    Hasher(String),
}

/// Hashes `secret` with a fresh random salt.
pub(crate) fn hash_secret(secret: &[u8]) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

/// Checks `secret` against a stored PHC digest.
///
/// The comparison itself is argon2's, which is constant-time over the output.
pub(crate) fn verify_secret(secret: &[u8], digest: &str) -> Result<bool, SecretVerifyError> {
    let parsed = PasswordHash::new(digest).map_err(|_| SecretVerifyError::Malformed)?;

    match Argon2::default().verify_password(secret, &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(SecretVerifyError::Hasher(e.to_string())),
    }
}
