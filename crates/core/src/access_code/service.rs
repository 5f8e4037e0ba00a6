//! Access code generation and verification.

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use super::digest::{SecretVerifyError, hash_secret, verify_secret};

/// Longest accepted plaintext. Anything longer cannot be a code and is not hashed.
const MAX_PLAINTEXT_LEN: usize = 32;

/// Errors raised while setting up or digesting access codes.
#[derive(Debug, Error)]
pub enum AccessCodeError {
    /// Width outside the supported range.
    #[error("access code width must be between {min} and {max}, got {width}")]
    InvalidWidth {
        /// Requested width.
        width: u32,
        /// Smallest supported width.
        min: u32,
        /// Largest supported width.
        max: u32,
    },

    /// The digest scheme failed.
    #[error("failed to digest access code: {0}")]
    Digest(String),
}

/// A freshly generated access code.
///
/// Its `Display` output is the exact plaintext the holder must present.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AccessCode {
    value: u32,
    width: u32,
}

impl AccessCode {
    /// Numeric value of the code.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Number of decimal digits.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }
}

impl std::fmt::Display for AccessCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0width$}", self.value, width = self.width as usize)
    }
}

impl std::fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessCode")
            .field("width", &self.width)
            .field("value", &"[hidden]")
            .finish()
    }
}

/// Generates fixed-width numeric codes and produces/verifies their salted digests.
#[derive(Clone)]
pub struct SecretCodeService {
    width: u32,
    decoy_digest: String,
}

impl std::fmt::Debug for SecretCodeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretCodeService")
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

impl SecretCodeService {
    /// Width used when none is configured.
    pub const DEFAULT_WIDTH: u32 = 6;
    /// Smallest supported width.
    pub const MIN_WIDTH: u32 = 1;
    /// Largest supported width (keeps every code inside a `u32`).
    pub const MAX_WIDTH: u32 = 9;

    /// Creates a service producing codes of `width` digits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWidth` for widths outside `1..=9`, or `Digest` if the
    /// internal decoy digest cannot be computed.
    pub fn new(width: u32) -> Result<Self, AccessCodeError> {
        if !(Self::MIN_WIDTH..=Self::MAX_WIDTH).contains(&width) {
            return Err(AccessCodeError::InvalidWidth {
                width,
                min: Self::MIN_WIDTH,
                max: Self::MAX_WIDTH,
            });
        }

        let (min, max) = Self::bounds(width);
        let decoy = rand::rng().random_range(min..=max);
        let decoy_digest =
            hash_secret(decoy.to_string().as_bytes()).map_err(AccessCodeError::Digest)?;

        Ok(Self {
            width,
            decoy_digest,
        })
    }

    /// Inclusive range of codes with exactly `width` digits.
    const fn bounds(width: u32) -> (u32, u32) {
        let min = 10u32.pow(width - 1);
        let max = 10u32.pow(width) - 1;
        (min, max)
    }

    /// Configured width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Draws a uniformly distributed code in `[10^(width-1), 10^width - 1]`.
    #[must_use]
    pub fn generate(&self) -> AccessCode {
        let (min, max) = Self::bounds(self.width);
        AccessCode {
            value: rand::rng().random_range(min..=max),
            width: self.width,
        }
    }

    /// Parses a presented code. Only ASCII digit strings of exactly `width`
    /// characters inside the generated range are accepted.
    #[must_use]
    pub fn parse(&self, input: &str) -> Option<AccessCode> {
        if input.len() != self.width as usize || !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = input.parse().ok()?;
        let (min, max) = Self::bounds(self.width);
        (min..=max).contains(&value).then_some(AccessCode {
            value,
            width: self.width,
        })
    }

    /// Produces a salted one-way digest of `plaintext`.
    ///
    /// Two calls with the same plaintext return different digests, so
    /// verification must go through [`Self::verify`].
    ///
    /// # Errors
    ///
    /// Returns `Digest` if the hasher fails.
    pub fn digest(&self, plaintext: &str) -> Result<String, AccessCodeError> {
        hash_secret(plaintext.as_bytes()).map_err(AccessCodeError::Digest)
    }

    /// Returns true iff `digest` was produced from `plaintext`.
    ///
    /// Never fails: malformed digests and oversized input are a mismatch.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        if plaintext.len() > MAX_PLAINTEXT_LEN {
            self.burn(plaintext);
            return false;
        }

        match verify_secret(plaintext.as_bytes(), digest) {
            Ok(matched) => matched,
            Err(SecretVerifyError::Malformed) => {
                warn!("stored access code digest is malformed");
                // Keep the work comparable to a real check.
                self.burn(plaintext);
                false
            }
            Err(SecretVerifyError::Hasher(reason)) => {
                warn!(%reason, "access code verification failed");
                false
            }
        }
    }

    /// Spends one verification's worth of work against the decoy digest.
    ///
    /// Called on lookup misses so a missing record costs the same as a wrong code.
    pub fn burn(&self, plaintext: &str) {
        let _ = verify_secret(bounded_plaintext(plaintext), &self.decoy_digest);
    }
}

/// At most `MAX_PLAINTEXT_LEN` bytes of `plaintext`, cut on a byte boundary.
fn bounded_plaintext(plaintext: &str) -> &[u8] {
    let bytes = plaintext.as_bytes();
    &bytes[..bytes.len().min(MAX_PLAINTEXT_LEN)]
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_generated_code_has_exact_width(width in 1u32..=9) {
            let service = SecretCodeService::new(width).expect("width in range");
            let code = service.generate();
            prop_assert_eq!(code.to_string().len(), width as usize);
            prop_assert!(!code.to_string().starts_with('0'));
        }
    }

    proptest! {
        // Argon2 is deliberately slow; a handful of cases is enough.
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_digest_verifies_only_its_plaintext(a in "[0-9]{6}", b in "[0-9]{6}") {
            let service = SecretCodeService::new(6).expect("width in range");
            let digest = service.digest(&a).expect("digest");
            prop_assert!(service.verify(&a, &digest));
            prop_assert_eq!(service.verify(&b, &digest), a == b);
        }
    }
}
