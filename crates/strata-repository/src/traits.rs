//! Repository trait definitions.

use crate::Outcome;
use async_trait::async_trait;
use strata_core::{HealthReport, Interface, PageRequest, StrataResult, User, UserDraft, UserId, UserPatch};
use strata_resilience::Deadline;

/// Cache-backed access to user records.
///
/// Every call carries the caller's [`Deadline`]. Store failures fail the
/// call; cache failures never do and come back as warnings on the
/// [`Outcome`].
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Fetches an active user, reading through the cache.
    async fn fetch_one(&self, id: UserId, deadline: Deadline) -> StrataResult<Outcome<User>>;

    /// Fetches one page of active users, newest first.
    async fn fetch_page(&self, page: PageRequest, deadline: Deadline) -> StrataResult<Outcome<Vec<User>>>;

    /// Creates a user. `Conflict` if an active user already has the email.
    async fn create_one(&self, draft: UserDraft, deadline: Deadline) -> StrataResult<Outcome<User>>;

    /// Applies a partial update to an active user.
    async fn update_one(&self, id: UserId, patch: UserPatch, deadline: Deadline) -> StrataResult<Outcome<User>>;

    /// Soft-deletes an active user.
    async fn delete_one(&self, id: UserId, deadline: Deadline) -> StrataResult<Outcome<()>>;

    /// Counts active users. Not cached.
    async fn count_active(&self, deadline: Deadline) -> StrataResult<u64>;

    /// Probes the store and the cache independently.
    async fn health(&self) -> HealthReport;
}
