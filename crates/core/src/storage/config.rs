//! Storage configuration types.

use coffer_shared::config::StorageSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory, lost on restart (tests and throwaway dev runs)
    Memory,
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create Azure Blob Storage provider.
    #[must_use]
    pub fn azure_blob(
        account: impl Into<String>,
        access_key: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self::AzureBlob {
            account: account.into(),
            access_key: access_key.into(),
            container: container.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Build a provider from flat application settings.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an unknown provider name or a missing required field.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        fn required(value: Option<&String>, field: &str) -> Result<String, StorageError> {
            value
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| StorageError::configuration(format!("storage.{field} is required")))
        }

        match settings.provider.as_str() {
            "s3" => Ok(Self::s3(
                required(settings.endpoint.as_ref(), "endpoint")?,
                required(settings.bucket.as_ref(), "bucket")?,
                required(settings.access_key_id.as_ref(), "access_key_id")?,
                required(settings.secret_access_key.as_ref(), "secret_access_key")?,
                settings.region.clone().unwrap_or_else(|| "auto".to_string()),
            )),
            "azure_blob" => Ok(Self::azure_blob(
                required(settings.access_key_id.as_ref(), "access_key_id")?,
                required(settings.secret_access_key.as_ref(), "secret_access_key")?,
                required(settings.bucket.as_ref(), "bucket")?,
            )),
            "local_fs" => Ok(Self::local_fs(&settings.root)),
            "memory" => Ok(Self::Memory),
            other => Err(StorageError::configuration(format!(
                "unknown storage provider '{other}'"
            ))),
        }
    }

    /// Provider name, used as the locator scheme.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local_fs",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket/container name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::AzureBlob { container, .. } => container,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Maximum object size in bytes.
    pub max_object_size: u64,
}

impl StorageConfig {
    /// Default max object size: 50MB.
    pub const DEFAULT_MAX_OBJECT_SIZE: u64 = 50_000_000;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            max_object_size: Self::DEFAULT_MAX_OBJECT_SIZE,
        }
    }

    /// Build from flat application settings.
    ///
    /// # Errors
    ///
    /// See [`StorageProvider::from_settings`].
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        Ok(Self::new(StorageProvider::from_settings(settings)?)
            .with_max_object_size(settings.max_object_size))
    }

    /// Set maximum object size.
    #[must_use]
    pub fn with_max_object_size(mut self, size: u64) -> Self {
        self.max_object_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_provider_s3() {
        let provider = StorageProvider::s3(
            "https://account.r2.cloudflarestorage.com",
            "coffer-blobs",
            "access_key",
            "secret_key",
            "auto",
        );
        assert_eq!(provider.name(), "s3");
        assert_eq!(provider.bucket(), "coffer-blobs");
    }

    #[test]
    fn test_storage_provider_azure() {
        let provider = StorageProvider::azure_blob("cofferdev", "access_key", "blobs");
        assert_eq!(provider.name(), "azure_blob");
        assert_eq!(provider.bucket(), "blobs");
    }

    #[test]
    fn test_storage_provider_local() {
        let provider = StorageProvider::local_fs("./storage");
        assert_eq!(provider.name(), "local_fs");
        assert_eq!(provider.bucket(), "./storage");
    }

    #[test]
    fn test_from_settings_defaults_to_local_fs() {
        let config = StorageConfig::from_settings(&StorageSettings::default()).unwrap();
        assert!(matches!(config.provider, StorageProvider::LocalFs { .. }));
        assert_eq!(config.max_object_size, StorageConfig::DEFAULT_MAX_OBJECT_SIZE);
    }

    #[test]
    fn test_from_settings_s3_requires_bucket() {
        let settings = StorageSettings {
            provider: "s3".to_string(),
            endpoint: Some("https://s3.example.com".to_string()),
            access_key_id: Some("id".to_string()),
            secret_access_key: Some("secret".to_string()),
            ..StorageSettings::default()
        };
        let err = StorageProvider::from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));

        let settings = StorageSettings {
            bucket: Some("blobs".to_string()),
            ..settings
        };
        let provider = StorageProvider::from_settings(&settings).unwrap();
        assert_eq!(provider.bucket(), "blobs");
    }

    #[test]
    fn test_from_settings_unknown_provider() {
        let settings = StorageSettings {
            provider: "ftp".to_string(),
            ..StorageSettings::default()
        };
        assert!(matches!(
            StorageProvider::from_settings(&settings),
            Err(StorageError::Configuration(_))
        ));
    }
}
