//! Application builder: store, cache, module, router, serve.

use crate::di::{build_memory_module, build_postgres_module, CacheBackend, DatabaseResolver, ServiceResolver};
use crate::startup::{print_startup_info, shutdown_signal};
use anyhow::Context;
use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use shaku::HasComponent;
use std::net::SocketAddr;
use std::sync::Arc;
use strata_config::{AppConfig, RedisConfig};
use strata_repository::{create_pool, create_redis_pool, metrics::register_metrics, CacheInterface, DatabasePoolInterface};
use strata_resilience::Deadline;
use strata_service::UserService;
use tracing::{info, warn};

/// Application builder for constructing the server.
pub struct AppBuilder {
    config: Option<AppConfig>,
}

impl AppBuilder {
    /// Creates a new application builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { config: None }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Connects the backends, builds the module and serves until shutdown.
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.config.unwrap_or_default();
        info!("Environment: {}", config.app.environment);

        let metrics = if config.observability.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .context("Failed to install Prometheus recorder")?;
            register_metrics();
            Some(handle)
        } else {
            None
        };

        let cache = connect_cache(&config.redis).await;
        info!(cache = cache.label(), "Cache backend selected");

        if config.database.is_memory() {
            info!("Using in-memory user store");
            let module = build_memory_module(&cache, &config);
            serve(module.as_ref(), &config, metrics).await?;
        } else {
            let db_pool = create_pool(&config.database)
                .await
                .context("Failed to connect to Postgres")?;
            let module = build_postgres_module(db_pool.inner().clone(), &cache, &config);
            let database = module.database_pool();

            if config.database.run_migrations {
                database.run_migrations().await.context("Failed to run migrations")?;
            }

            let served = serve(module.as_ref(), &config, metrics).await;
            database.close().await;
            served?;
        }

        info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the cache backend. A Redis that cannot be reached at startup
/// degrades to the disabled cache instead of failing the boot.
pub async fn connect_cache(config: &RedisConfig) -> CacheBackend {
    if !config.enabled {
        info!("Cache disabled by configuration");
        return CacheBackend::Disabled;
    }

    if config.is_memory() {
        return CacheBackend::Memory;
    }

    match create_redis_pool(config).await {
        Ok(pool) => CacheBackend::Redis(Arc::new(pool)),
        Err(e) => {
            warn!(error = %e, "Redis unavailable at startup, continuing with the cache disabled");
            CacheBackend::Disabled
        }
    }
}

/// Builds the full router, with the metrics route when enabled.
pub fn build_app<M>(module: &M, config: &AppConfig, metrics: Option<PrometheusHandle>) -> Router
where
    M: HasComponent<dyn UserService> + HasComponent<dyn CacheInterface>,
{
    let router = strata_rest::create_router(module, config);

    match metrics {
        Some(handle) => router.route(
            &config.observability.metrics_path,
            get(move || std::future::ready(handle.render())),
        ),
        None => router,
    }
}

async fn serve<M>(module: &M, config: &AppConfig, metrics: Option<PrometheusHandle>) -> anyhow::Result<()>
where
    M: ServiceResolver + HasComponent<dyn UserService> + HasComponent<dyn CacheInterface>,
{
    let deadline = Deadline::after(config.server.request_timeout());
    match module.user_service().count_users(deadline).await {
        Ok(count) => info!(active_users = count, "User store ready"),
        Err(e) => warn!(error = %e, "Could not count active users"),
    }

    let router = build_app(module, config, metrics);

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    print_startup_info(config);
    info!("Starting REST server on http://{}", addr);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("REST server error")?;

    Ok(())
}
