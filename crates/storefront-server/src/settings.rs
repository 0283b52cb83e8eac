//! Server settings.
//!
//! Loaded from an optional TOML file (`storefront.toml`, or the path in
//! `STOREFRONT_CONFIG`) with environment overrides such as
//! `STOREFRONT__SERVER__PORT=8080` or `STOREFRONT__CACHE__BACKEND=redis`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::cache::PopulateMode;

/// Default settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "storefront.toml";

/// Environment variable naming an alternative settings file.
pub const CONFIG_PATH_ENV: &str = "STOREFRONT_CONFIG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub catalog: CatalogSettings,
    pub uploads: UploadSettings,
    pub payments: PaymentSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackendKind,
    pub redis: RedisSettings,
    /// Entry bound for the in-memory backend.
    pub max_capacity: u64,
    /// Lifetime of cached search pages.
    pub search_ttl_secs: u64,
    pub populate: PopulateMode,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Memory,
            redis: RedisSettings::default(),
            max_capacity: 10_000,
            search_ttl_secs: 30,
            populate: PopulateMode::Inline,
        }
    }
}

impl CacheSettings {
    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub url: String,
    pub pool_size: usize,
    pub timeout_ms: u64,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            pool_size: 10,
            timeout_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub per_page: usize,
    pub latest_limit: usize,
    pub max_photos: usize,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            per_page: 8,
            latest_limit: 5,
            max_photos: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub dir: PathBuf,
    /// URL prefix photos are served under.
    pub public_prefix: String,
    pub max_body_mb: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            public_prefix: "/uploads".to_string(),
            max_body_mb: 20,
        }
    }
}

impl UploadSettings {
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    /// Without a key payments run against the sandbox gateway.
    pub stripe_secret_key: Option<String>,
    pub stripe_api_base: String,
    pub currency: String,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            stripe_secret_key: None,
            stripe_api_base: "https://api.stripe.com".to_string(),
            currency: "inr".to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the default locations and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    /// Loads settings from `path` (skipped when absent) and the environment.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("STOREFRONT")
                .try_parsing(true)
                .separator("__"),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::invalid("server.port", "must be non-zero"));
        }
        if self.catalog.per_page == 0 {
            return Err(SettingsError::invalid("catalog.per_page", "must be non-zero"));
        }
        if self.catalog.max_photos == 0 {
            return Err(SettingsError::invalid("catalog.max_photos", "must be non-zero"));
        }
        if self.cache.search_ttl_secs == 0 {
            return Err(SettingsError::invalid(
                "cache.search_ttl_secs",
                "must be non-zero",
            ));
        }
        if self.cache.backend == CacheBackendKind::Redis && self.cache.redis.url.is_empty() {
            return Err(SettingsError::invalid("cache.redis.url", "required for redis"));
        }
        Ok(())
    }

    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| {
                SettingsError::invalid("server.host", e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.catalog.per_page, 8);
        assert_eq!(settings.cache.search_ttl(), Duration::from_secs(30));
        assert_eq!(settings.addr().unwrap().port(), 4000);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[cache]
search_ttl_secs = 10
populate = "detached"

[catalog]
per_page = 12
"#
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.cache.search_ttl_secs, 10);
        assert_eq!(settings.cache.populate, PopulateMode::Detached);
        assert_eq!(settings.catalog.per_page, 12);
        // Untouched sections keep their defaults
        assert_eq!(settings.catalog.latest_limit, 5);
        assert_eq!(settings.cache.backend, CacheBackendKind::Memory);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/storefront.toml")).unwrap();
        assert_eq!(settings.uploads.public_prefix, "/uploads");
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut settings = Settings::default();
        settings.catalog.per_page = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { key: "catalog.per_page", .. })
        ));

        let mut settings = Settings::default();
        settings.cache.search_ttl_secs = 0;
        assert!(settings.validate().is_err());
    }
}
