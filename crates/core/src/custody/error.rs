//! File custody error types.

use coffer_shared::{FileId, OwnerId};
use thiserror::Error;

use super::compensation::CompensationOutcome;

/// Every way a custody operation can fail.
///
/// Adapter errors are folded into these kinds at the service boundary.
#[derive(Debug, Error)]
pub enum CustodyError {
    /// The owner does not exist.
    #[error("owner {0} does not exist")]
    OwnerNotFound(OwnerId),

    /// No record with this id belongs to the given owner.
    ///
    /// Also returned for another owner's file so existence is not leaked.
    #[error("file {0} does not exist")]
    FileNotFound(FileId),

    /// The supplied access code does not match.
    #[error("invalid access code for file {0}")]
    InvalidCode(FileId),

    /// Rejected before touching any store.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Object exceeds the configured size limit.
    #[error("object of {size} bytes exceeds maximum allowed {max} bytes")]
    ObjectTooLarge {
        /// Actual size.
        size: u64,
        /// Configured limit.
        max: u64,
    },

    /// The blob store rejected the write. Nothing was persisted.
    #[error("failed to write object to storage: {0}")]
    BlobWriteFailed(String),

    /// The blob store rejected the delete. Record and blob are both untouched.
    #[error("failed to delete object from storage: {0}")]
    BlobDeleteFailed(String),

    /// The record could not be written after the blob was.
    #[error("failed to store file record: {reason} ({compensation})")]
    RecordWriteFailed {
        /// Why the record write failed.
        reason: String,
        /// What happened to the already written blob.
        compensation: CompensationOutcome,
    },

    /// Reading records or owners failed.
    #[error("failed to read file records: {0}")]
    RecordReadFailed(String),

    /// The blob is gone but its record could not be removed.
    ///
    /// The object is inaccessible, as requested, but bookkeeping needs reconciliation.
    #[error("file {file_id} was removed from storage but its record remains: {reason}")]
    PartialDeleteFailure {
        /// Record left behind.
        file_id: FileId,
        /// Why the record delete failed.
        reason: String,
    },
}

impl CustodyError {
    /// True when the stores are left inconsistent and operations must follow up.
    #[must_use]
    pub const fn needs_reconciliation(&self) -> bool {
        match self {
            Self::PartialDeleteFailure { .. } => true,
            Self::RecordWriteFailed { compensation, .. } => compensation.left_blob_behind(),
            _ => false,
        }
    }
}
