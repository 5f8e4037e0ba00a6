//! File custody types and data structures.

use chrono::{DateTime, Utc};
use coffer_shared::{FileId, OwnerId};
use serde::Serialize;

use crate::access_code::AccessCode;

/// Fields the record store needs to create a row. The store assigns `id` and `created_at`.
#[derive(Clone)]
pub struct NewFileRecord {
    /// Owner creating the file.
    pub owner_id: OwnerId,
    /// Name supplied at upload.
    pub object_name: String,
    /// Locator returned by the blob store.
    pub blob_locator: String,
    /// Salted digest of the access code.
    pub code_digest: String,
}

impl std::fmt::Debug for NewFileRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewFileRecord")
            .field("owner_id", &self.owner_id)
            .field("object_name", &self.object_name)
            .finish_non_exhaustive()
    }
}

/// Store-assigned identity of a newly inserted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredFile {
    /// Assigned id.
    pub id: FileId,
    /// Assigned creation time.
    pub created_at: DateTime<Utc>,
}

/// The authoritative metadata row for one stored object.
///
/// Deliberately not `Serialize`: the locator and digest must never reach a
/// response body. `Debug` output redacts both.
#[derive(Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Unique id.
    pub id: FileId,
    /// Owner that created the record.
    pub owner_id: OwnerId,
    /// Original name supplied at upload.
    pub object_name: String,
    /// Opaque blob-store locator.
    pub blob_locator: String,
    /// Salted digest of the access code.
    pub code_digest: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Listing view of this record.
    #[must_use]
    pub fn summary(&self) -> FileSummary {
        FileSummary {
            id: self.id,
            object_name: self.object_name.clone(),
            created_at: self.created_at,
        }
    }
}

impl std::fmt::Debug for FileRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRecord")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("object_name", &self.object_name)
            .field("blob_locator", &"[redacted]")
            .field("code_digest", &"[redacted]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Listing entry. Has no locator or digest field to leak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// File id.
    pub id: FileId,
    /// Name supplied at upload.
    pub object_name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<FileRecord> for FileSummary {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            object_name: record.object_name,
            created_at: record.created_at,
        }
    }
}

/// Result of a successful upload.
///
/// `access_code` is the only copy of the plaintext; it is not stored anywhere.
#[derive(Debug, Clone, Copy)]
pub struct UploadReceipt {
    /// Id of the new record.
    pub file_id: FileId,
    /// Plaintext access code.
    pub access_code: AccessCode,
}
