//! Health check controller.

use crate::{responses::ApiResponse, state::AppState};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use strata_core::HealthStatus;
use utoipa::ToSchema;

/// Status of one dependency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&HealthStatus> for ComponentHealth {
    fn from(status: &HealthStatus) -> Self {
        Self {
            status: status.label().to_string(),
            message: status.message().map(ToString::to_string),
        }
    }
}

/// Per-dependency health.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServicesHealth {
    pub store: ComponentHealth,
    pub cache: ComponentHealth,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Application version.
    pub version: String,
    pub services: ServicesHealth,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Health check endpoint.
///
/// 200 while the store answers, even with a degraded cache; 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let report = state.user_service.health().await;

    let status = if report.is_serving() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: report.overall().label().to_string(),
        version: state.app.version.clone(),
        services: ServicesHealth {
            store: (&report.store).into(),
            cache: (&report.cache).into(),
        },
    };

    (status, Json(ApiResponse::success(body)))
}
