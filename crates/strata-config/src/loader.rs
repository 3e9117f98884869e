//! Configuration loader with layered sources.

use crate::{format_validation_errors, AppConfig, ConfigValidator};
use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use std::sync::Arc;
use strata_core::StrataError;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Uncommitted local overrides
    /// 4. Environment variables with `STRATA__` prefix
    pub fn new(config_dir: impl Into<String>) -> Result<Self, StrataError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, StrataError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk. The previous configuration is
    /// kept when the new one fails to load or validate.
    pub async fn reload(&self) -> Result<(), StrataError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, StrataError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("STRATA_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{config_dir}/{name}.toml");
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("STRATA")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_error_to_strata_error)?;

        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(config_error_to_strata_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn validate_config(config: &AppConfig) -> Result<(), StrataError> {
        if config.app.environment == "production" && config.database.is_memory() {
            warn!("Using the in-memory store in production; data will not survive a restart");
        }

        ConfigValidator::validate(config)
            .map_err(|errors| StrataError::Configuration(format_validation_errors(&errors)))
    }
}

fn config_error_to_strata_error(err: ConfigError) -> StrataError {
    StrataError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CollectionInvalidation;
    use std::fs;

    #[tokio::test]
    async fn test_missing_directory_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path().join("absent").to_string_lossy()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.record_ttl_secs, 3600);
    }

    #[tokio::test]
    async fn test_layered_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 9000\n\n[cache]\nlist_ttl_secs = 600\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("local.toml"),
            "[cache]\ncollection_invalidation = \"generation\"\n",
        )
        .unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        let config = loader.get().await;
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.cache.list_ttl_secs, 600);
        assert_eq!(config.cache.record_ttl_secs, 3600);
        assert_eq!(
            config.cache.collection_invalidation,
            CollectionInvalidation::Generation
        );
    }

    #[tokio::test]
    async fn test_invalid_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[cache]\nrecord_ttl_secs = 0\n").unwrap();

        let result = ConfigLoader::new(dir.path().to_string_lossy());
        assert!(matches!(result, Err(StrataError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.toml");
        fs::write(&path, "[server]\nport = 9001\n").unwrap();

        let loader = ConfigLoader::new(dir.path().to_string_lossy()).unwrap();
        assert_eq!(loader.get().await.server.port, 9001);

        fs::write(&path, "[server]\nport = 9002\n").unwrap();
        loader.reload().await.unwrap();
        assert_eq!(loader.get().await.server.port, 9002);

        fs::write(&path, "[server]\nport = 0\n").unwrap();
        assert!(loader.reload().await.is_err());
        assert_eq!(loader.get().await.server.port, 9002);
    }
}
