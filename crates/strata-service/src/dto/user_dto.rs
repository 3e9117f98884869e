//! User-related DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strata_core::{Email, StrataError, User, UserDraft, UserPatch};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

/// Request to update a user. Only the fields present are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,
}

impl TryFrom<CreateUserRequest> for UserDraft {
    type Error = StrataError;

    fn try_from(request: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::parse(&request.email)?,
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
        })
    }
}

impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = StrataError;

    fn try_from(request: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: request.email.as_deref().map(Email::parse).transpose()?,
            username: request.username,
            first_name: request.first_name,
            last_name: request.last_name,
        })
    }
}

/// User response DTO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.into_inner(),
            email: user.email.into(),
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A single user, wrapped as `{ "user": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

impl From<User> for UserEnvelope {
    fn from(user: User) -> Self {
        Self { user: user.into() }
    }
}

/// One page of users with the normalized paging that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub page: u32,
    pub limit: u32,
}
