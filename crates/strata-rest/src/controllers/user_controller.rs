//! User management controller.

use crate::{
    extractors::{UserIdPath, ValidatedJson},
    responses::{created, no_content, ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use strata_service::{CreateUserRequest, PaginationQuery, UpdateUserRequest, UserEnvelope, UserListResponse};
use tracing::debug;

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// List active users, newest first.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of users", body = UserListResponse),
        (status = 503, description = "Store unavailable", body = strata_core::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<UserListResponse> {
    debug!("List users request");

    let response = state.user_service.list_users(pagination, state.deadline()).await?;
    ok(response)
}

/// Create a new user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = strata_core::ErrorResponse),
        (status = 409, description = "Email already in use", body = strata_core::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserEnvelope>>), AppError> {
    debug!("Create user request: {}", request.username);

    let user = state.user_service.create_user(request, state.deadline()).await?;
    Ok(created(UserEnvelope { user }))
}

/// Get a user by ID.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "The user", body = UserEnvelope),
        (status = 400, description = "Malformed ID", body = strata_core::ErrorResponse),
        (status = 404, description = "No active user with this ID", body = strata_core::ErrorResponse)
    )
)]
pub async fn get_user(State(state): State<AppState>, UserIdPath(id): UserIdPath) -> ApiResult<UserEnvelope> {
    debug!("Get user request: {}", id);

    let user = state.user_service.get_user(id, state.deadline()).await?;
    ok(UserEnvelope { user })
}

/// Update a user's profile.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "The updated user", body = UserEnvelope),
        (status = 400, description = "Empty or invalid update", body = strata_core::ErrorResponse),
        (status = 404, description = "No active user with this ID", body = strata_core::ErrorResponse),
        (status = 409, description = "Email already in use", body = strata_core::ErrorResponse)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    UserIdPath(id): UserIdPath,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserEnvelope> {
    debug!("Update user request: {}", id);

    let user = state.user_service.update_user(id, request, state.deadline()).await?;
    ok(UserEnvelope { user })
}

/// Soft-delete a user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed ID", body = strata_core::ErrorResponse),
        (status = 404, description = "No active user with this ID", body = strata_core::ErrorResponse)
    )
)]
pub async fn delete_user(State(state): State<AppState>, UserIdPath(id): UserIdPath) -> Result<StatusCode, AppError> {
    debug!("Delete user request: {}", id);

    state.user_service.delete_user(id, state.deadline()).await?;
    Ok(no_content())
}
