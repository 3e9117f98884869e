//! Service banner.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Root endpoint response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub environment: String,
}

/// Root endpoint handler.
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} API", state.app.name),
        version: state.app.version.clone(),
        environment: state.app.environment.clone(),
    })
}
