//! OpenAPI documentation configuration.

use crate::controllers::{ComponentHealth, HealthResponse, ServicesHealth};
use strata_core::{ErrorResponse, FieldError};
use strata_service::{CreateUserRequest, UpdateUserRequest, UserEnvelope, UserListResponse, UserResponse};
use utoipa::OpenApi;

/// OpenAPI documentation for the Strata API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Strata API",
        version = "1.0.0",
        description = "User records served through a cache-backed repository"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        crate::controllers::user_controller::list_users,
        crate::controllers::user_controller::create_user,
        crate::controllers::user_controller::get_user,
        crate::controllers::user_controller::update_user,
        crate::controllers::user_controller::delete_user,
        crate::controllers::health_controller::health_check,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            UserEnvelope,
            UserListResponse,
            HealthResponse,
            ServicesHealth,
            ComponentHealth,
        )
    ),
    tags(
        (name = "users", description = "User management endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;
