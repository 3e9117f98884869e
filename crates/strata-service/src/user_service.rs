//! User service trait definition.

use crate::dto::{CreateUserRequest, PaginationQuery, UpdateUserRequest, UserListResponse, UserResponse};
use async_trait::async_trait;
use strata_core::{HealthReport, Interface, StrataResult, UserId};
use strata_resilience::Deadline;

/// User service trait.
///
/// Each call runs against the caller's deadline. Cache trouble is logged,
/// never returned.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Lists active users, newest first.
    async fn list_users(&self, query: PaginationQuery, deadline: Deadline) -> StrataResult<UserListResponse>;

    /// Gets an active user by ID.
    async fn get_user(&self, id: UserId, deadline: Deadline) -> StrataResult<UserResponse>;

    /// Creates a new user.
    async fn create_user(&self, request: CreateUserRequest, deadline: Deadline) -> StrataResult<UserResponse>;

    /// Updates the fields present in the request.
    async fn update_user(
        &self,
        id: UserId,
        request: UpdateUserRequest,
        deadline: Deadline,
    ) -> StrataResult<UserResponse>;

    /// Soft-deletes a user.
    async fn delete_user(&self, id: UserId, deadline: Deadline) -> StrataResult<()>;

    /// Counts active users.
    async fn count_users(&self, deadline: Deadline) -> StrataResult<u64>;

    /// Reports store and cache health.
    async fn health(&self) -> HealthReport;
}
