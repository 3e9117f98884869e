//! Cache key conventions.
//!
//! These exact formats are shared with any cache already warmed by other
//! deployments of the service, so they must not change.

use strata_core::{PageRequest, UserId};

/// Prefix of single-record keys.
pub const USER_PREFIX: &str = "user:";

/// Prefix of list-page keys.
pub const USERS_LIST_PREFIX: &str = "users:list:";

/// Pattern matching every list-page key.
pub const USERS_LIST_PATTERN: &str = "users:list:*";

/// Counter used by generation-based list invalidation. Kept outside the
/// page namespace so a sweep never resets it.
pub const USERS_LIST_GENERATION: &str = "users:list-generation";

/// Key of a single user record.
#[must_use]
pub fn user_by_id(id: UserId) -> String {
    format!("{USER_PREFIX}{id}")
}

/// Key of one page of the user list.
#[must_use]
pub fn users_list(page: PageRequest) -> String {
    format!("{USERS_LIST_PREFIX}{}:{}", page.page(), page.size())
}

/// Key of one page of the user list under a list generation.
#[must_use]
pub fn users_list_generation(generation: i64, page: PageRequest) -> String {
    format!("{USERS_LIST_PREFIX}g{generation}:{}:{}", page.page(), page.size())
}

/// Key of a client's rate-limit window counter.
#[must_use]
pub fn rate_limit(client: &str) -> String {
    format!("ratelimit:{client}")
}
