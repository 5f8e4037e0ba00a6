//! In-memory store fakes with fault injection.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::Utc;
use coffer_shared::{FileId, OwnerId};
use tokio::sync::Semaphore;

use super::store::{
    BlobStore, BlobStoreError, OwnerDirectory, RecordStore, RecordStoreError,
};
use super::types::{FileRecord, NewFileRecord, StoredFile};

const LOCATOR_PREFIX: &str = "memory://test/";

/// Blob store backed by a map.
#[derive(Default)]
pub(crate) struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, Bytes>>,
    fail_puts: AtomicBool,
    fail_deletes: AtomicBool,
    delete_attempts: AtomicUsize,
    put_attempts: AtomicUsize,
    put_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl InMemoryBlobStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Makes every later `put` wait for a permit on the returned semaphore.
    pub(crate) fn hold_puts(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.put_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub(crate) fn put_attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_attempts(&self) -> usize {
        self.delete_attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn contains_locator(&self, locator: &str) -> bool {
        locator
            .strip_prefix(LOCATOR_PREFIX)
            .is_some_and(|key| self.objects.lock().unwrap().contains_key(key))
    }

    pub(crate) fn read_locator(&self, locator: &str) -> Option<Bytes> {
        let key = locator.strip_prefix(LOCATOR_PREFIX)?;
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<String, BlobStoreError> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        let gate = self.put_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(BlobStoreError::new("injected put failure"));
        }
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("{LOCATOR_PREFIX}{key}"))
    }

    async fn delete(&self, locator: &str) -> Result<(), BlobStoreError> {
        self.delete_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobStoreError::new("injected delete failure"));
        }
        let key = locator
            .strip_prefix(LOCATOR_PREFIX)
            .ok_or_else(|| BlobStoreError::new(format!("foreign locator: {locator}")))?;
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Record store backed by an ordered map with sequential ids.
#[derive(Default)]
pub(crate) struct InMemoryRecordStore {
    rows: Mutex<BTreeMap<FileId, FileRecord>>,
    next_id: AtomicUsize,
    fail_inserts: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryRecordStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub(crate) fn get(&self, id: FileId) -> Option<FileRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: NewFileRecord) -> Result<StoredFile, RecordStoreError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(RecordStoreError::new("injected insert failure"));
        }
        let id = FileId(i64::try_from(self.next_id.fetch_add(1, Ordering::SeqCst) + 1).unwrap());
        let created_at = Utc::now();
        self.rows.lock().unwrap().insert(
            id,
            FileRecord {
                id,
                owner_id: record.owner_id,
                object_name: record.object_name,
                blob_locator: record.blob_locator,
                code_digest: record.code_digest,
                created_at,
            },
        );
        Ok(StoredFile { id, created_at })
    }

    async fn select_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<FileRecord>, RecordStoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn select_one(
        &self,
        id: FileId,
        owner_id: OwnerId,
    ) -> Result<Option<FileRecord>, RecordStoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&id)
            .filter(|r| r.owner_id == owner_id)
            .cloned())
    }

    async fn delete_by_id(&self, id: FileId) -> Result<(), RecordStoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RecordStoreError::new("injected delete failure"));
        }
        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// Owner directory with a fixed set of known owners.
#[derive(Default)]
pub(crate) struct StaticOwners {
    known: HashSet<OwnerId>,
    fail: AtomicBool,
}

impl StaticOwners {
    pub(crate) fn with(ids: &[i64]) -> Self {
        Self {
            known: ids.iter().copied().map(OwnerId).collect(),
            fail: AtomicBool::new(false),
        }
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl OwnerDirectory for StaticOwners {
    async fn exists(&self, owner_id: OwnerId) -> Result<bool, RecordStoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RecordStoreError::new("injected lookup failure"));
        }
        Ok(self.known.contains(&owner_id))
    }
}
