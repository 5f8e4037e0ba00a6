//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// File custody tuning.
    #[serde(default)]
    pub custody: CustodySettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Object storage configuration.
///
/// Kept as flat strings here so this crate stays free of storage dependencies;
/// `coffer-core` turns it into a typed provider and reports missing fields.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// One of `s3`, `azure_blob`, `local_fs`, `memory`.
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    /// S3 endpoint URL.
    pub endpoint: Option<String>,
    /// S3 bucket or Azure container.
    pub bucket: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// S3 access key ID or Azure account name.
    pub access_key_id: Option<String>,
    /// S3 secret access key or Azure account key.
    pub secret_access_key: Option<String>,
    /// Root directory for `local_fs`.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum accepted object size in bytes.
    #[serde(default = "default_max_object_size")]
    pub max_object_size: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            endpoint: None,
            bucket: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
            root: default_storage_root(),
            max_object_size: default_max_object_size(),
        }
    }
}

fn default_storage_provider() -> String {
    "local_fs".to_string()
}

fn default_storage_root() -> String {
    "./data/blobs".to_string()
}

fn default_max_object_size() -> u64 {
    50_000_000
}

/// File custody tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct CustodySettings {
    /// Number of decimal digits in generated access codes.
    #[serde(default = "default_access_code_width")]
    pub access_code_width: u32,
    /// Serialize concurrent uploads of the same owner and object name.
    #[serde(default)]
    pub serialize_uploads: bool,
}

impl Default for CustodySettings {
    fn default() -> Self {
        Self {
            access_code_width: default_access_code_width(),
            serialize_uploads: false,
        }
    }
}

fn default_access_code_width() -> u32 {
    6
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("COFFER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("COFFER__DATABASE__URL", Some("postgres://localhost/coffer")),
                ("COFFER__JWT__SECRET", Some("secret")),
                ("COFFER__STORAGE__PROVIDER", None),
                ("COFFER__CUSTODY__ACCESS_CODE_WIDTH", None),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/coffer");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 5000);
                assert_eq!(config.jwt.access_token_expiry_secs, 3600);
                assert_eq!(config.storage.provider, "local_fs");
                assert_eq!(config.storage.max_object_size, 50_000_000);
                assert_eq!(config.custody.access_code_width, 6);
                assert!(!config.custody.serialize_uploads);
            },
        );
    }

    #[test]
    fn test_load_overrides_nested_sections() {
        temp_env::with_vars(
            [
                ("COFFER__DATABASE__URL", Some("postgres://db/coffer")),
                ("COFFER__JWT__SECRET", Some("secret")),
                ("COFFER__SERVER__PORT", Some("8081")),
                ("COFFER__STORAGE__PROVIDER", Some("memory")),
                ("COFFER__CUSTODY__ACCESS_CODE_WIDTH", Some("8")),
                ("COFFER__CUSTODY__SERIALIZE_UPLOADS", Some("true")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.port, 8081);
                assert_eq!(config.storage.provider, "memory");
                assert_eq!(config.custody.access_code_width, 8);
                assert!(config.custody.serialize_uploads);
            },
        );
    }

    #[test]
    fn test_load_fails_without_database_url() {
        temp_env::with_vars(
            [
                ("COFFER__DATABASE__URL", None::<&str>),
                ("COFFER__JWT__SECRET", Some("secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
