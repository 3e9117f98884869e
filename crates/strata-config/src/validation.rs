//! Configuration validation.
//!
//! Collects every problem in one pass so a bad deployment fails fast at
//! startup with the full list instead of one error per restart.

use crate::{AppConfig, CacheConfig, DatabaseConfig, ObservabilityConfig, RedisConfig, ServerConfig};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Port number is invalid (must be 1-65535).
    InvalidPort { value: u16 },
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { value: u32, maximum: u32 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or expiry must be positive.
    NonPositiveDuration { name: String },
    /// List pages must not outlive single records.
    ListTtlExceedsRecordTtl { list: u64, record: u64 },
    /// The cache budget must be tighter than the store budget.
    CacheTimeoutNotBelowStore { cache: u64, store: u64 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPort { value } => {
                write!(f, "Invalid server port: {value} (must be 1-65535)")
            }
            Self::InvalidPoolSize { min, max } => {
                write!(f, "Invalid pool size: min ({min}) must not exceed max ({max})")
            }
            Self::PoolSizeTooLarge { value, maximum } => {
                write!(f, "Pool size too large: {value} (maximum {maximum})")
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {url_type} URL: {message}")
            }
            Self::NonPositiveDuration { name } => write!(f, "{name} must be greater than zero"),
            Self::ListTtlExceedsRecordTtl { list, record } => write!(
                f,
                "cache.list_ttl_secs ({list}) must not exceed cache.record_ttl_secs ({record})"
            ),
            Self::CacheTimeoutNotBelowStore { cache, store } => write!(
                f,
                "cache.cache_timeout_ms ({cache}) must be below cache.store_timeout_ms ({store})"
            ),
            Self::InvalidLogLevel { value } => write!(
                f,
                "Invalid log level: {value} (must be trace, debug, info, warn, or error)"
            ),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 1000;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&config.server, &mut errors);
        Self::validate_database(&config.database, &mut errors);
        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(config: &ServerConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.port == 0 {
            errors.push(ConfigValidationError::InvalidPort { value: config.port });
        }
        if config.request_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "server.request_timeout_secs".to_string(),
            });
        }
        if config.rate_limit_enabled && config.rate_limit_per_minute == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "server.rate_limit_per_minute".to_string(),
            });
        }
    }

    fn validate_database(config: &DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "Database URL is required".to_string(),
            });
            return;
        }

        if !config.is_memory() {
            match Url::parse(&config.url) {
                Ok(url) if matches!(url.scheme(), "postgres" | "postgresql") => {}
                Ok(url) => errors.push(ConfigValidationError::InvalidUrl {
                    url_type: "database".to_string(),
                    message: format!("Unsupported scheme: {}", url.scheme()),
                }),
                Err(e) => errors.push(ConfigValidationError::InvalidUrl {
                    url_type: "database".to_string(),
                    message: e.to_string(),
                }),
            }

            if config.min_connections > config.max_connections {
                errors.push(ConfigValidationError::InvalidPoolSize {
                    min: config.min_connections,
                    max: config.max_connections,
                });
            }
            if config.max_connections > Self::MAX_POOL_SIZE {
                errors.push(ConfigValidationError::PoolSizeTooLarge {
                    value: config.max_connections,
                    maximum: Self::MAX_POOL_SIZE,
                });
            }
            if config.connect_timeout_secs == 0 {
                errors.push(ConfigValidationError::NonPositiveDuration {
                    name: "database.connect_timeout_secs".to_string(),
                });
            }
        }
    }

    fn validate_redis(config: &RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled || config.is_memory() {
            return;
        }

        if !config.url.starts_with("redis://") && !config.url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "Redis URL must start with redis:// or rediss://".to_string(),
            });
        }
        if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_cache(config: &CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        for (name, value) in [
            ("cache.record_ttl_secs", config.record_ttl_secs),
            ("cache.list_ttl_secs", config.list_ttl_secs),
            ("cache.store_timeout_ms", config.store_timeout_ms),
            ("cache.cache_timeout_ms", config.cache_timeout_ms),
        ] {
            if value == 0 {
                errors.push(ConfigValidationError::NonPositiveDuration {
                    name: name.to_string(),
                });
            }
        }

        if config.list_ttl_secs > config.record_ttl_secs {
            errors.push(ConfigValidationError::ListTtlExceedsRecordTtl {
                list: config.list_ttl_secs,
                record: config.record_ttl_secs,
            });
        }
        if config.cache_timeout_ms >= config.store_timeout_ms {
            errors.push(ConfigValidationError::CacheTimeoutNotBelowStore {
                cache: config.cache_timeout_ms,
                store: config.store_timeout_ms,
            });
        }
    }

    fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
    }
}

/// Formats validation errors into a human-readable string.
#[must_use]
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_memory_backends_pass() {
        let mut config = AppConfig::default();
        config.database.url = "memory://".to_string();
        config.redis.url = "memory://".to_string();
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_empty_database_url() {
        let mut config = AppConfig::default();
        config.database.url = String::new();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigValidationError::InvalidUrl { url_type, .. } if url_type == "database"
        ));
    }

    #[test]
    fn test_unsupported_database_scheme() {
        let mut config = AppConfig::default();
        config.database.url = "mysql://localhost/strata".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("mysql"));
    }

    #[test]
    fn test_invalid_redis_url() {
        let mut config = AppConfig::default();
        config.redis.url = "http://localhost:6379".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(
            &errors[0],
            ConfigValidationError::InvalidUrl { url_type, .. } if url_type == "redis"
        ));

        config.redis.enabled = false;
        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = AppConfig::default();
        config.cache.record_ttl_secs = 0;
        config.cache.list_ttl_secs = 0;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_list_ttl_longer_than_record_ttl() {
        let mut config = AppConfig::default();
        config.cache.list_ttl_secs = 7200;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigValidationError::ListTtlExceedsRecordTtl {
                list: 7200,
                record: 3600
            }]
        );
    }

    #[test]
    fn test_cache_timeout_must_be_below_store_timeout() {
        let mut config = AppConfig::default();
        config.cache.cache_timeout_ms = 5000;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ConfigValidationError::CacheTimeoutNotBelowStore { cache: 5000, store: 5000 }
        ));
    }

    #[test]
    fn test_invalid_pool_size() {
        let mut config = AppConfig::default();
        config.database.min_connections = 50;
        config.database.max_connections = 10;
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(matches!(errors[0], ConfigValidationError::InvalidPoolSize { min: 50, max: 10 }));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.observability.log_level = "verbose".to_string();
        let errors = ConfigValidator::validate(&config).unwrap_err();
        assert!(format_validation_errors(&errors).contains("verbose"));
    }
}
