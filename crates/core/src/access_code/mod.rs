//! Short numeric access codes.
//!
//! A code is handed to the uploader exactly once. Only its Argon2id digest is
//! persisted, so a holder proves possession by presenting the plaintext again.

mod digest;
mod service;

pub(crate) use digest::{SecretVerifyError, hash_secret, verify_secret};
pub use service::{AccessCode, AccessCodeError, SecretCodeService};
