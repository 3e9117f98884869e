//! `UserDao` trait: the persistent store adapter.
//!
//! Every query is restricted to active rows. There is no way to read a
//! logically deleted user through this interface, and no hard delete.
//!
//! [`UserRepository`] layers caching and timeouts over a `UserDao`.
//!
//! [`UserRepository`]: crate::traits::UserRepository

use async_trait::async_trait;
use strata_core::{Email, Interface, StrataResult, User, UserDraft, UserId, UserPatch};

/// Low-level user data access object. Authoritative source of truth.
#[async_trait]
pub trait UserDao: Interface + Send + Sync {
    /// Inserts a new active user built from `draft` and returns it.
    ///
    /// A unique-constraint violation on the active email is reported as
    /// `Conflict`.
    async fn insert(&self, draft: &UserDraft) -> StrataResult<User>;

    /// Finds an active user by ID.
    async fn find_active_by_id(&self, id: UserId) -> StrataResult<Option<User>>;

    /// Finds an active user by normalized email.
    async fn find_active_by_email(&self, email: &Email) -> StrataResult<Option<User>>;

    /// Lists active users, newest first (`created_at DESC, id DESC`).
    async fn find_active_page(&self, limit: i64, offset: i64) -> StrataResult<Vec<User>>;

    /// Applies the set columns of `patch` to an active user and bumps
    /// `updated_at`. Returns the number of rows changed (0 or 1).
    async fn update_active(&self, id: UserId, patch: &UserPatch) -> StrataResult<u64>;

    /// Marks an active user inactive. Returns the number of rows changed.
    async fn soft_delete(&self, id: UserId) -> StrataResult<u64>;

    /// Counts active users.
    async fn count_active(&self) -> StrataResult<u64>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> StrataResult<()>;
}
