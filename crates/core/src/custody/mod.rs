//! File custody across the object store and the record store.
//!
//! This module provides:
//! - Store contracts (`BlobStore`, `RecordStore`, `OwnerDirectory`)
//! - Upload with compensation when the record write fails
//! - Owner listing that never carries locators or digests
//! - Code-verified retrieval scoped to the creating owner
//! - Deletion that keeps record and blob consistent
//!
//! There is no shared transaction manager between the two stores. Consistency
//! comes from ordering (blob first on upload, blob first on delete) plus a
//! single compensating delete when an upload's record insert fails.

mod compensation;
mod error;
mod locks;
mod service;
mod store;
mod types;

#[cfg(test)]
mod fakes;

pub use compensation::CompensationOutcome;
pub use error::CustodyError;
pub use service::{
    CustodyOptions, FileCustodyService, MAX_OBJECT_NAME_LEN, sanitize_object_name, storage_key,
};
pub use store::{BlobStore, BlobStoreError, OwnerDirectory, RecordStore, RecordStoreError};
pub use types::{FileRecord, FileSummary, NewFileRecord, StoredFile, UploadReceipt};
