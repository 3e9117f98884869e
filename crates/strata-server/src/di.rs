//! Dependency injection modules using Shaku.
//!
//! - `PostgresModule`: users stored in Postgres
//! - `MemoryModule`: users stored in process memory (development, demos)
//!
//! Both put the same cache component in front of the store. The cache is
//! Redis, the in-process `MemoryCache` (via component override), or the
//! disabled Redis service when no pool is available.

use deadpool_redis::Pool;
use sqlx::PgPool;
use std::sync::Arc;
use strata_config::AppConfig;
use strata_core::{module, HasComponent};
use strata_repository::{
    CacheInterface, CachePolicy, CachedUserRepository, CachedUserRepositoryParameters, DatabasePool,
    DatabasePoolInterface, DatabasePoolParameters, InMemoryUserDao, MemoryCache, PostgresUserDao,
    RedisCacheService, RedisCacheServiceParameters, UserRepository,
};
use strata_service::{UserService, UserServiceComponent};

module! {
    pub PostgresModule {
        components = [
            DatabasePool,
            PostgresUserDao,
            RedisCacheService,
            CachedUserRepository,
            UserServiceComponent,
        ],
        providers = [],
    }
}

module! {
    pub MemoryModule {
        components = [
            InMemoryUserDao,
            RedisCacheService,
            CachedUserRepository,
            UserServiceComponent,
        ],
        providers = [],
    }
}

/// The cache selected at startup.
#[derive(Clone)]
pub enum CacheBackend {
    /// A connected Redis pool.
    Redis(Arc<Pool>),
    /// The in-process cache.
    Memory,
    /// Every read misses, every write is a no-op.
    Disabled,
}

impl CacheBackend {
    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Redis(_) => "redis",
            Self::Memory => "memory",
            Self::Disabled => "disabled",
        }
    }

    fn redis_parameters(&self, config: &AppConfig) -> RedisCacheServiceParameters {
        RedisCacheServiceParameters {
            pool: match self {
                Self::Redis(pool) => Some(Arc::clone(pool)),
                Self::Memory | Self::Disabled => None,
            },
            key_scan: config.redis.key_scan,
            scan_count: config.redis.scan_count.max(1),
        }
    }
}

impl std::fmt::Debug for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Builds the module for a Postgres-backed deployment.
pub fn build_postgres_module(pool: PgPool, cache: &CacheBackend, config: &AppConfig) -> Arc<PostgresModule> {
    let mut builder = PostgresModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters { pool })
        .with_component_parameters::<RedisCacheService>(cache.redis_parameters(config))
        .with_component_parameters::<CachedUserRepository>(CachedUserRepositoryParameters {
            policy: CachePolicy::from(&config.cache),
        });

    if matches!(cache, CacheBackend::Memory) {
        builder = builder.with_component_override::<dyn CacheInterface>(Box::new(MemoryCache::new()));
    }

    Arc::new(builder.build())
}

/// Builds the module for an in-memory deployment.
pub fn build_memory_module(cache: &CacheBackend, config: &AppConfig) -> Arc<MemoryModule> {
    let mut builder = MemoryModule::builder()
        .with_component_parameters::<RedisCacheService>(cache.redis_parameters(config))
        .with_component_parameters::<CachedUserRepository>(CachedUserRepositoryParameters {
            policy: CachePolicy::from(&config.cache),
        });

    if matches!(cache, CacheBackend::Memory) {
        builder = builder.with_component_override::<dyn CacheInterface>(Box::new(MemoryCache::new()));
    }

    Arc::new(builder.build())
}

/// Trait for resolving the services the HTTP layer needs.
pub trait ServiceResolver {
    /// Resolves the user service from the module.
    fn user_service(&self) -> Arc<dyn UserService>;

    /// Resolves the cache the rate limiter counts through.
    fn cache(&self) -> Arc<dyn CacheInterface>;

    /// Resolves the cache-backed repository.
    fn user_repository(&self) -> Arc<dyn UserRepository>;
}

impl<M> ServiceResolver for M
where
    M: HasComponent<dyn UserService> + HasComponent<dyn CacheInterface> + HasComponent<dyn UserRepository>,
{
    fn user_service(&self) -> Arc<dyn UserService> {
        self.resolve()
    }

    fn cache(&self) -> Arc<dyn CacheInterface> {
        self.resolve()
    }

    fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.resolve()
    }
}

/// Trait for resolving the database pool from modules that have it.
pub trait DatabaseResolver {
    /// Resolves the database pool from the module.
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;
}

impl DatabaseResolver for PostgresModule {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::HealthStatus;
    use strata_resilience::Deadline;
    use strata_service::CreateUserRequest;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "memory://".to_string();
        config.redis.url = "memory://".to_string();
        config
    }

    #[test]
    fn test_has_component_trait_bounds() {
        fn _assert_has_user_service<T: HasComponent<dyn UserService>>() {}
        fn _assert_has_user_repository<T: HasComponent<dyn UserRepository>>() {}
        fn _assert_has_cache<T: HasComponent<dyn CacheInterface>>() {}
        fn _assert_has_database_pool<T: HasComponent<dyn DatabasePoolInterface>>() {}
        fn _assert_service_resolver<T: ServiceResolver>() {}

        _assert_has_user_service::<PostgresModule>();
        _assert_has_user_repository::<PostgresModule>();
        _assert_has_cache::<PostgresModule>();
        _assert_has_database_pool::<PostgresModule>();
        _assert_service_resolver::<PostgresModule>();

        _assert_has_user_service::<MemoryModule>();
        _assert_has_user_repository::<MemoryModule>();
        _assert_has_cache::<MemoryModule>();
        _assert_service_resolver::<MemoryModule>();
    }

    #[tokio::test]
    async fn test_memory_module_serves_users() {
        let config = memory_config();
        let module = build_memory_module(&CacheBackend::Memory, &config);

        let cache = module.cache();
        assert!(cache.is_enabled());

        let service = module.user_service();
        let created = service
            .create_user(
                CreateUserRequest {
                    email: "ada@example.com".to_string(),
                    username: "ada".to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                },
                Deadline::none(),
            )
            .await
            .unwrap();

        let fetched = service.get_user(created.id.into(), Deadline::none()).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(service.count_users(Deadline::none()).await.unwrap(), 1);
        assert_eq!(service.health().await.cache, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_disabled_cache_reports_degraded() {
        let config = memory_config();
        let module = build_memory_module(&CacheBackend::Disabled, &config);

        assert!(!module.cache().is_enabled());
        let report = module.user_repository().health().await;
        assert!(report.is_serving());
        assert!(matches!(report.cache, HealthStatus::Degraded(_)));
    }

    #[tokio::test]
    async fn test_postgres_module_takes_pool_parameter() {
        let mut config = AppConfig::default();
        config.database.url = "postgres://strata@localhost:5432/strata".to_string();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();

        let module = build_postgres_module(pool, &CacheBackend::Disabled, &config);
        let db = module.database_pool();
        assert!(!db.inner().is_closed());
        assert!(!module.cache().is_enabled());
        let _service = module.user_service();
    }

    #[test]
    fn test_redis_parameters_follow_backend() {
        let mut config = AppConfig::default();
        config.redis.scan_count = 0;

        let params = CacheBackend::Disabled.redis_parameters(&config);
        assert!(params.pool.is_none());
        assert_eq!(params.scan_count, 1);
        assert_eq!(CacheBackend::Memory.label(), "memory");
    }
}
