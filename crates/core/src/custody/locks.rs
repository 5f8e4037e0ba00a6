//! Per-key async locks for serializing uploads to the same storage key.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Map of storage key to mutex. Entries are removed when no one holds them.
#[derive(Debug, Default, Clone)]
pub(crate) struct KeyedLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// Held while an upload owns a storage key.
pub(crate) struct KeyGuard {
    key: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits until `key` is free and takes it.
    pub(crate) async fn acquire(&self, key: &str) -> KeyGuard {
        let mutex = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        KeyGuard {
            key: key.to_string(),
            locks: Arc::clone(&self.inner),
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Release first so the strong count reflects only waiters and the map.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
