//! Storage service implementation using Apache OpenDAL.

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use tracing::debug;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use crate::custody::{BlobStore, BlobStoreError};

/// Object storage for custody blobs.
///
/// Locators have the form `{provider}://{bucket}/{key}`. Only locators issued
/// by a service with the same provider and bucket resolve back to a key.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()
                .pipe(Ok),
        }
    }

    /// Reject objects above the configured size.
    ///
    /// # Errors
    ///
    /// Returns `ObjectTooLarge` if `size` exceeds `max_object_size`.
    pub fn validate_size(&self, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_object_size {
            return Err(StorageError::object_too_large(
                size,
                self.config.max_object_size,
            ));
        }
        Ok(())
    }

    /// Locator for a storage key.
    #[must_use]
    pub fn locator(&self, key: &str) -> String {
        format!("{}{key}", self.locator_prefix())
    }

    /// Resolve a locator issued by this service back to its storage key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocator` for foreign, empty or path-escaping locators.
    pub fn key_for_locator<'a>(&self, locator: &'a str) -> Result<&'a str, StorageError> {
        let key = locator
            .strip_prefix(&self.locator_prefix())
            .ok_or_else(|| StorageError::InvalidLocator(locator.to_string()))?;

        if key.is_empty() || key.split('/').any(|part| part.is_empty() || part == "..") {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }
        Ok(key)
    }

    fn locator_prefix(&self) -> String {
        format!(
            "{}://{}/",
            self.config.provider.name(),
            self.config.provider.bucket().trim_end_matches('/')
        )
    }

    /// Write an object at `key`, replacing any existing one, and return its locator.
    ///
    /// # Errors
    ///
    /// Returns `ObjectTooLarge` or an operation error from the backend.
    pub async fn put(&self, key: &str, bytes: Bytes) -> Result<String, StorageError> {
        self.validate_size(bytes.len() as u64)?;

        let size = bytes.len();
        self.operator
            .write(key, bytes)
            .await
            .map_err(StorageError::from)?;

        debug!(key = %key, size, "object written");
        Ok(self.locator(key))
    }

    /// Read the whole object behind `locator`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocator`, `NotFound`, or an operation error.
    pub async fn read(&self, locator: &str) -> Result<Bytes, StorageError> {
        let key = self.key_for_locator(locator)?;
        let buffer = self.operator.read(key).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(key)
            } else {
                StorageError::from(e)
            }
        })?;
        Ok(buffer.to_bytes())
    }

    /// Delete the object behind `locator`. Deleting a missing object succeeds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLocator` or an operation error.
    pub async fn delete(&self, locator: &str) -> Result<(), StorageError> {
        let key = self.key_for_locator(locator)?;
        self.operator.delete(key).await.map_err(StorageError::from)?;
        debug!(key = %key, "object deleted");
        Ok(())
    }

    /// Check if the object behind `locator` exists.
    pub async fn exists(&self, locator: &str) -> bool {
        let Ok(key) = self.key_for_locator(locator) else {
            return false;
        };
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl BlobStore for StorageService {
    async fn put(&self, key: &str, bytes: Bytes) -> Result<String, BlobStoreError> {
        Self::put(self, key, bytes)
            .await
            .map_err(|e| BlobStoreError::new(e.to_string()))
    }

    async fn delete(&self, locator: &str) -> Result<(), BlobStoreError> {
        Self::delete(self, locator)
            .await
            .map_err(|e| BlobStoreError::new(e.to_string()))
    }
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
