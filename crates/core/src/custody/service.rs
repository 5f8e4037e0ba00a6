//! File custody service implementation.

use std::sync::Arc;

use bytes::Bytes;
use coffer_shared::{FileId, OwnerId};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use super::compensation::{Compensation, CompensationLog};
use super::error::CustodyError;
use super::locks::KeyedLocks;
use super::store::{BlobStore, OwnerDirectory, RecordStore};
use super::types::{FileRecord, FileSummary, NewFileRecord, UploadReceipt};
use crate::access_code::SecretCodeService;

/// Longest accepted object name, in characters.
pub const MAX_OBJECT_NAME_LEN: usize = 255;

/// Behaviour switches for [`FileCustodyService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CustodyOptions {
    /// Hold a per-key lock across the blob write and the record insert.
    ///
    /// Without it, concurrent uploads of the same name by the same owner race
    /// and a record may end up pointing at the other request's bytes.
    pub serialize_uploads: bool,
    /// Largest accepted object in bytes. `None` means unlimited.
    pub max_object_size: Option<u64>,
}

/// Coordinates the blob store and the record store for one file lifecycle.
pub struct FileCustodyService<B, R, O> {
    blobs: Arc<B>,
    records: Arc<R>,
    owners: Arc<O>,
    codes: SecretCodeService,
    options: CustodyOptions,
    locks: Option<KeyedLocks>,
}

impl<B, R, O> Clone for FileCustodyService<B, R, O> {
    fn clone(&self) -> Self {
        Self {
            blobs: Arc::clone(&self.blobs),
            records: Arc::clone(&self.records),
            owners: Arc::clone(&self.owners),
            codes: self.codes.clone(),
            options: self.options,
            locks: self.locks.clone(),
        }
    }
}

impl<B, R, O> FileCustodyService<B, R, O>
where
    B: BlobStore,
    R: RecordStore,
    O: OwnerDirectory,
{
    /// Create a new custody service over the given stores.
    #[must_use]
    pub fn new(
        blobs: Arc<B>,
        records: Arc<R>,
        owners: Arc<O>,
        codes: SecretCodeService,
        options: CustodyOptions,
    ) -> Self {
        let locks = options.serialize_uploads.then(KeyedLocks::new);
        Self {
            blobs,
            records,
            owners,
            codes,
            options,
            locks,
        }
    }

    /// The blob store this service writes to.
    #[must_use]
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Stores `bytes` under `object_name` for `owner_id` and returns a fresh access code.
    ///
    /// Re-uploading the same name replaces the stored bytes at that key (latest
    /// wins); every upload still gets its own record and code.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty or overlong name, or empty bytes
    /// - `ObjectTooLarge` above the configured limit
    /// - `OwnerNotFound` if the owner does not exist
    /// - `BlobWriteFailed` if the object could not be stored (nothing persisted)
    /// - `RecordWriteFailed` if the record could not be stored; the blob has
    ///   been deleted again unless the annotation says otherwise
    pub async fn upload(
        &self,
        owner_id: OwnerId,
        object_name: &str,
        bytes: Bytes,
    ) -> Result<UploadReceipt, CustodyError> {
        self.validate_object(object_name, &bytes)?;
        self.ensure_owner(owner_id).await?;

        let key = storage_key(owner_id, object_name);
        let _key_guard = match &self.locks {
            Some(locks) => Some(locks.acquire(&key).await),
            None => None,
        };

        let mut undo = CompensationLog::new();

        let size = bytes.len();
        let locator = self.blobs.put(&key, bytes).await.map_err(|e| {
            warn!(owner_id = %owner_id, key = %key, error = %e, "blob write failed");
            CustodyError::BlobWriteFailed(e.to_string())
        })?;
        undo.record(Compensation::RemoveBlob {
            locator: locator.clone(),
        });

        let access_code = self.codes.generate();
        let code_digest = match self.codes.digest(&access_code.to_string()) {
            Ok(digest) => digest,
            Err(e) => {
                error!(owner_id = %owner_id, error = %e, "access code digest failed");
                let compensation = undo.unwind(self.blobs.as_ref()).await;
                return Err(CustodyError::RecordWriteFailed {
                    reason: e.to_string(),
                    compensation,
                });
            }
        };

        let record = NewFileRecord {
            owner_id,
            object_name: object_name.to_string(),
            blob_locator: locator,
            code_digest,
        };

        match self.records.insert(record).await {
            Ok(stored) => {
                undo.commit();
                info!(
                    owner_id = %owner_id,
                    file_id = %stored.id,
                    size,
                    "file stored"
                );
                Ok(UploadReceipt {
                    file_id: stored.id,
                    access_code,
                })
            }
            Err(e) => {
                error!(owner_id = %owner_id, key = %key, error = %e, "file record insert failed");
                let compensation = undo.unwind(self.blobs.as_ref()).await;
                Err(CustodyError::RecordWriteFailed {
                    reason: e.to_string(),
                    compensation,
                })
            }
        }
    }

    /// Lists an owner's files, oldest first. Locators and digests are not part of the result.
    ///
    /// # Errors
    ///
    /// `OwnerNotFound` for an unknown owner, `RecordReadFailed` if a store read fails.
    pub async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<FileSummary>, CustodyError> {
        self.ensure_owner(owner_id).await?;

        let records = self
            .records
            .select_by_owner(owner_id)
            .await
            .map_err(|e| CustodyError::RecordReadFailed(e.to_string()))?;

        debug!(owner_id = %owner_id, count = records.len(), "listed files");
        Ok(records.into_iter().map(FileSummary::from).collect())
    }

    /// Returns the full record if `supplied_code` matches the one issued at upload.
    ///
    /// A missing record and another owner's record look the same. Both spend
    /// one digest verification, like a wrong code does.
    ///
    /// # Errors
    ///
    /// `FileNotFound`, `InvalidCode`, or `RecordReadFailed`.
    pub async fn verify_and_reveal(
        &self,
        owner_id: OwnerId,
        file_id: FileId,
        supplied_code: &str,
    ) -> Result<FileRecord, CustodyError> {
        let Some(record) = self.find_owned(owner_id, file_id).await? else {
            self.codes.burn(supplied_code);
            debug!(owner_id = %owner_id, file_id = %file_id, "verify on missing file");
            return Err(CustodyError::FileNotFound(file_id));
        };

        let matched = match self.codes.parse(supplied_code) {
            Some(code) => self.codes.verify(&code.to_string(), &record.code_digest),
            None => {
                self.codes.burn(supplied_code);
                false
            }
        };

        if !matched {
            info!(owner_id = %owner_id, file_id = %file_id, "access code rejected");
            return Err(CustodyError::InvalidCode(file_id));
        }

        info!(owner_id = %owner_id, file_id = %file_id, "access code accepted");
        Ok(record)
    }

    /// Deletes a file: blob first, then its record.
    ///
    /// # Errors
    ///
    /// - `FileNotFound` if absent or owned by someone else
    /// - `BlobDeleteFailed` if the blob could not be deleted; the record is kept
    /// - `PartialDeleteFailure` if the blob is gone but the record remains
    pub async fn delete(&self, owner_id: OwnerId, file_id: FileId) -> Result<(), CustodyError> {
        let record = self
            .find_owned(owner_id, file_id)
            .await?
            .ok_or(CustodyError::FileNotFound(file_id))?;

        self.blobs
            .delete(&record.blob_locator)
            .await
            .map_err(|e| {
                warn!(owner_id = %owner_id, file_id = %file_id, error = %e, "blob delete failed, record kept");
                CustodyError::BlobDeleteFailed(e.to_string())
            })?;

        if let Err(e) = self.records.delete_by_id(file_id).await {
            error!(
                alert = "stale_record",
                owner_id = %owner_id,
                file_id = %file_id,
                error = %e,
                "blob deleted but record delete failed"
            );
            return Err(CustodyError::PartialDeleteFailure {
                file_id,
                reason: e.to_string(),
            });
        }

        info!(owner_id = %owner_id, file_id = %file_id, "file deleted");
        Ok(())
    }

    fn validate_object(&self, object_name: &str, bytes: &Bytes) -> Result<(), CustodyError> {
        if object_name.trim().is_empty() {
            return Err(CustodyError::InvalidInput(
                "object name must not be empty".to_string(),
            ));
        }
        if object_name.chars().count() > MAX_OBJECT_NAME_LEN {
            return Err(CustodyError::InvalidInput(format!(
                "object name must be at most {MAX_OBJECT_NAME_LEN} characters"
            )));
        }
        if bytes.is_empty() {
            return Err(CustodyError::InvalidInput(
                "object must not be empty".to_string(),
            ));
        }
        if let Some(max) = self.options.max_object_size {
            let size = bytes.len() as u64;
            if size > max {
                return Err(CustodyError::ObjectTooLarge { size, max });
            }
        }
        Ok(())
    }

    async fn ensure_owner(&self, owner_id: OwnerId) -> Result<(), CustodyError> {
        let exists = self
            .owners
            .exists(owner_id)
            .await
            .map_err(|e| CustodyError::RecordReadFailed(e.to_string()))?;

        if exists {
            Ok(())
        } else {
            Err(CustodyError::OwnerNotFound(owner_id))
        }
    }

    async fn find_owned(
        &self,
        owner_id: OwnerId,
        file_id: FileId,
    ) -> Result<Option<FileRecord>, CustodyError> {
        self.records
            .select_one(file_id, owner_id)
            .await
            .map_err(|e| CustodyError::RecordReadFailed(e.to_string()))
    }
}

/// Storage key for an owner's object: `{owner_id}/{name_digest}/{sanitized_name}`.
///
/// `name_digest` is the hex SHA-256 of the raw name, so distinct names never
/// share a key even when they sanitize alike. The same name from the same
/// owner always maps to the same key.
#[must_use]
pub fn storage_key(owner_id: OwnerId, object_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(object_name.as_bytes());
    format!(
        "{owner_id}/{:x}/{}",
        hasher.finalize(),
        sanitize_object_name(object_name)
    )
}

/// Sanitize an object name for the last storage key segment and for
/// `Content-Disposition` headers.
///
/// Only ASCII alphanumerics, dots, hyphens and underscores survive; everything
/// else becomes `_`. A name made only of dots becomes underscores so the key
/// can never walk out of the owner's prefix.
#[must_use]
pub fn sanitize_object_name(object_name: &str) -> String {
    let sanitized: String = object_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '.') {
        "_".repeat(sanitized.len().max(1))
    } else {
        sanitized
    }
}
