//! Contracts for the two external stores and the owner lookup.
//!
//! These traits are implemented by the storage module (OpenDAL) and the db
//! crate (SeaORM). Their errors stay opaque strings: the custody service
//! wraps each one into a [`CustodyError`](super::CustodyError) kind, so raw
//! backend errors never cross this boundary.

use std::future::Future;

use bytes::Bytes;
use coffer_shared::{FileId, OwnerId};
use thiserror::Error;

use super::types::{FileRecord, NewFileRecord, StoredFile};

/// Failure reported by a blob store adapter.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BlobStoreError(pub String);

impl BlobStoreError {
    /// Create a blob store error from any message.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Failure reported by a record store or owner directory adapter.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RecordStoreError(pub String);

impl RecordStoreError {
    /// Create a record store error from any message.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Durable object storage keyed by a path string.
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` at `key`, replacing any existing object, and returns its locator.
    fn put(
        &self,
        key: &str,
        bytes: Bytes,
    ) -> impl Future<Output = Result<String, BlobStoreError>> + Send;

    /// Deletes the object a previous `put` returned `locator` for.
    fn delete(&self, locator: &str) -> impl Future<Output = Result<(), BlobStoreError>> + Send;
}

/// Relational persistence for file metadata.
pub trait RecordStore: Send + Sync {
    /// Creates a record; the store assigns id and creation time.
    fn insert(
        &self,
        record: NewFileRecord,
    ) -> impl Future<Output = Result<StoredFile, RecordStoreError>> + Send;

    /// All records of an owner, oldest first.
    fn select_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> impl Future<Output = Result<Vec<FileRecord>, RecordStoreError>> + Send;

    /// The record with `id` if and only if it belongs to `owner_id`.
    fn select_one(
        &self,
        id: FileId,
        owner_id: OwnerId,
    ) -> impl Future<Output = Result<Option<FileRecord>, RecordStoreError>> + Send;

    /// Removes the record with `id`.
    fn delete_by_id(&self, id: FileId)
    -> impl Future<Output = Result<(), RecordStoreError>> + Send;
}

/// Read-only view of the account subsystem.
pub trait OwnerDirectory: Send + Sync {
    /// Whether an owner with this id exists.
    fn exists(
        &self,
        owner_id: OwnerId,
    ) -> impl Future<Output = Result<bool, RecordStoreError>> + Send;
}
