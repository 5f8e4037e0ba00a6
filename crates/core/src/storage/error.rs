//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object size exceeds maximum allowed.
    #[error("object size {size} bytes exceeds maximum allowed {max} bytes")]
    ObjectTooLarge {
        /// Actual object size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Object not found in storage.
    #[error("object not found: {key}")]
    NotFound {
        /// Storage key that was not found.
        key: String,
    },

    /// Storage provider configuration error.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// Any other OpenDAL failure.
    #[error("storage operation failed: {0}")]
    Operation(String),

    /// Locator was not issued by this storage service.
    #[error("invalid locator: {0}")]
    InvalidLocator(String),
}

impl StorageError {
    /// Create an object too large error.
    #[must_use]
    pub fn object_too_large(size: u64, max: u64) -> Self {
        Self::ObjectTooLarge { size, max }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound {
                key: err.to_string(),
            },
            _ => Self::Operation(err.to_string()),
        }
    }
}
