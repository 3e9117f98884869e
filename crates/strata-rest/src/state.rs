//! Application state for Axum handlers.

use shaku::HasComponent;
use std::sync::Arc;
use std::time::Duration;
use strata_config::{AppConfig, AppMetadata};
use strata_repository::CacheInterface;
use strata_resilience::Deadline;
use strata_service::UserService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub cache: Arc<dyn CacheInterface>,
    pub app: Arc<AppMetadata>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        user_service: Arc<dyn UserService>,
        cache: Arc<dyn CacheInterface>,
        config: &AppConfig,
    ) -> Self {
        Self {
            user_service,
            cache,
            app: Arc::new(config.app.clone()),
            request_timeout: config.server.request_timeout(),
        }
    }

    /// Resolves the services from a Shaku module.
    pub fn from_module<M>(module: &M, config: &AppConfig) -> Self
    where
        M: HasComponent<dyn UserService> + HasComponent<dyn CacheInterface>,
    {
        let user_service: Arc<dyn UserService> = module.resolve();
        let cache: Arc<dyn CacheInterface> = module.resolve();
        Self::new(user_service, cache, config)
    }

    /// A fresh deadline for one inbound request.
    #[must_use]
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }
}
