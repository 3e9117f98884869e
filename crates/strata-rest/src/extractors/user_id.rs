//! Path extractor for user identifiers.

use crate::responses::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use strata_core::{StrataError, UserId};

/// A `UserId` parsed from the `:id` path segment.
///
/// Malformed identifiers are rejected with 400 before any handler runs.
#[derive(Debug, Clone, Copy)]
pub struct UserIdPath(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for UserIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid_id())?;
        parse_user_id(&raw).map(Self)
    }
}

/// Parses a path segment into a `UserId`.
pub fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    UserId::parse(raw).map_err(|_| invalid_id())
}

fn invalid_id() -> AppError {
    AppError(StrataError::validation("Invalid user ID format"))
}
