//! Main application router.

use crate::{
    controllers::{health_controller, root, user_controller},
    middleware::{logging_middleware, rate_limit_middleware, RateLimitState},
    openapi::ApiDoc,
    responses::not_found,
    state::AppState,
};
use axum::{http::HeaderValue, middleware, routing::get, Router};
use shaku::HasComponent;
use strata_config::{AppConfig, ServerConfig};
use strata_repository::CacheInterface;
use strata_service::UserService;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates the main application router from a Shaku module.
///
/// The module must provide the `UserService` and the `CacheInterface`
/// the rate limiter counts through.
pub fn create_router<M>(module: &M, config: &AppConfig) -> Router
where
    M: HasComponent<dyn UserService> + HasComponent<dyn CacheInterface>,
{
    build_router(AppState::from_module(module, config), config)
}

/// Creates the main application router from prepared state.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let cors = create_cors_layer(&config.server);

    let api_router = Router::new()
        .nest("/users", user_controller::router())
        .merge(health_controller::router());

    let mut router = Router::new()
        .nest("/api/v1", api_router)
        .route("/", get(root))
        .fallback(not_found)
        .with_state(state.clone())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if config.server.rate_limit_enabled {
        let limiter = RateLimitState::per_minute(
            state.cache,
            config.server.rate_limit_per_minute,
            config.cache.cache_timeout(),
        );
        router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
    }

    let router = router
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created with REST endpoints and Swagger UI at /swagger-ui");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }

    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
