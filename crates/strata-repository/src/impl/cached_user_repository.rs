//! `CachedUserRepository`: read-through, write-invalidate access to users.
//!
//! ```text
//! Service
//!   ↓ Arc<dyn UserRepository>
//! CachedUserRepository        ← cache discipline, deadlines, warnings
//!   ↓ Arc<dyn UserDao>          ↓ Arc<dyn CacheInterface>
//! Postgres / in-memory         Redis / in-memory / disabled
//! ```
//!
//! Every mutation reaches the store before the cache is touched. Cache
//! failures never fail a call; they are returned as [`CacheWarning`]s.

use crate::cache::{cache_keys, CacheExt, CacheInterface};
use crate::dao::UserDao;
use crate::metrics::{CacheMetrics, FAMILY_COLLECTION, FAMILY_RECORD};
use crate::outcome::{CacheOp, CacheWarning, Outcome};
use crate::traits::UserRepository;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use strata_config::{CacheConfig, CollectionInvalidation};
use strata_core::{
    HealthReport, HealthStatus, PageRequest, StrataError, StrataResult, User, UserDraft, UserId, UserPatch,
};
use strata_resilience::{Deadline, TimeoutConfig};
use tracing::{debug, info, warn};

/// Lower bound on how long the list generation counter lives.
const MIN_GENERATION_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Expiry, call budgets and list invalidation used by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Expiry of `user:{id}` entries.
    pub record_ttl: Duration,
    /// Expiry of list-page entries.
    pub list_ttl: Duration,
    /// Per-call store and cache budgets.
    pub timeouts: TimeoutConfig,
    /// How list pages are dropped after a write.
    pub invalidation: CollectionInvalidation,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            record_ttl: config.record_ttl(),
            list_ttl: config.list_ttl(),
            timeouts: TimeoutConfig {
                store: config.store_timeout(),
                cache: config.cache_timeout(),
            },
            invalidation: config.collection_invalidation,
        }
    }
}

impl CachePolicy {
    /// The generation counter must outlive every page cached under it.
    fn generation_window(&self) -> Duration {
        (self.list_ttl * 2).max(MIN_GENERATION_WINDOW)
    }
}

/// Repository over a [`UserDao`] with a [`CacheInterface`] in front of it.
#[derive(Component)]
#[shaku(interface = UserRepository)]
pub struct CachedUserRepository {
    #[shaku(inject)]
    user_dao: Arc<dyn UserDao>,
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
    policy: CachePolicy,
}

impl CachedUserRepository {
    /// Creates a repository from its collaborators.
    #[must_use]
    pub fn new(user_dao: Arc<dyn UserDao>, cache: Arc<dyn CacheInterface>, policy: CachePolicy) -> Self {
        Self {
            user_dao,
            cache,
            policy,
        }
    }

    /// The active policy.
    #[must_use]
    pub const fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    fn record_warning(warnings: &mut Vec<CacheWarning>, op: CacheOp, key: &str, err: &StrataError) {
        warn!(op = %op, key = %key, error = %err, "Cache maintenance failed");
        CacheMetrics::warning(op);
        warnings.push(CacheWarning {
            op,
            key: key.to_string(),
            message: err.to_string(),
        });
    }

    /// Cache lookup. Errors and undecodable payloads count as a miss.
    async fn read_cached<T: DeserializeOwned + Send>(
        &self,
        key: &str,
        family: &'static str,
        deadline: Deadline,
        warnings: &mut Vec<CacheWarning>,
    ) -> Option<T> {
        if !self.cache.is_enabled() {
            return None;
        }
        match self.policy.timeouts.cache_call(deadline, || self.cache.get::<T>(key)).await {
            Ok(Some(value)) => {
                debug!(key = %key, "Cache hit");
                CacheMetrics::hit(family);
                Some(value)
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                CacheMetrics::miss(family);
                None
            }
            Err(err) => {
                CacheMetrics::miss(family);
                Self::record_warning(warnings, CacheOp::Read, key, &err);
                None
            }
        }
    }

    async fn populate<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        deadline: Deadline,
        warnings: &mut Vec<CacheWarning>,
    ) {
        if !self.cache.is_enabled() {
            return;
        }
        let result = self
            .policy
            .timeouts
            .cache_call(deadline, || self.cache.set(key, value, ttl))
            .await;
        if let Err(err) = result {
            Self::record_warning(warnings, CacheOp::Populate, key, &err);
        }
    }

    async fn evict(&self, key: &str, deadline: Deadline, warnings: &mut Vec<CacheWarning>) {
        if !self.cache.is_enabled() {
            return;
        }
        let keys = [key.to_string()];
        let result = self
            .policy
            .timeouts
            .cache_call(deadline, || self.cache.delete(&keys))
            .await;
        if let Err(err) = result {
            Self::record_warning(warnings, CacheOp::Delete, key, &err);
        }
    }

    /// Drops every cached list page. Any insert, update or delete can
    /// shift the contents of every page, so no page survives.
    async fn invalidate_collections(&self, deadline: Deadline, warnings: &mut Vec<CacheWarning>) {
        if !self.cache.is_enabled() {
            return;
        }
        let timeouts = self.policy.timeouts;
        match self.policy.invalidation {
            CollectionInvalidation::Sweep => {
                let result = timeouts
                    .cache_call(deadline, || self.cache.delete_pattern(cache_keys::USERS_LIST_PATTERN))
                    .await;
                match result {
                    Ok(deleted) => debug!(deleted, "Swept cached list pages"),
                    Err(err) => Self::record_warning(
                        warnings,
                        CacheOp::InvalidateCollections,
                        cache_keys::USERS_LIST_PATTERN,
                        &err,
                    ),
                }
            }
            CollectionInvalidation::Generation => {
                let cache = &self.cache;
                let window = self.policy.generation_window();
                let result = timeouts
                    .cache_call(deadline, || async move {
                        cache
                            .set_nx(cache_keys::USERS_LIST_GENERATION, &generation_seed().to_string(), window)
                            .await?;
                        cache.increment(cache_keys::USERS_LIST_GENERATION, window).await
                    })
                    .await;
                match result {
                    Ok(generation) => debug!(generation, "Advanced list generation"),
                    Err(err) => Self::record_warning(
                        warnings,
                        CacheOp::InvalidateCollections,
                        cache_keys::USERS_LIST_GENERATION,
                        &err,
                    ),
                }
            }
        }
    }

    /// Reads the list generation, seeding it if absent.
    async fn current_generation(&self, deadline: Deadline) -> StrataResult<i64> {
        let cache = &self.cache;
        let window = self.policy.generation_window();
        self.policy
            .timeouts
            .cache_call(deadline, || async move {
                if let Some(raw) = cache.get_raw(cache_keys::USERS_LIST_GENERATION).await? {
                    return parse_generation(&raw);
                }
                let seed = generation_seed();
                if cache
                    .set_nx(cache_keys::USERS_LIST_GENERATION, &seed.to_string(), window)
                    .await?
                {
                    return Ok(seed);
                }
                match cache.get_raw(cache_keys::USERS_LIST_GENERATION).await? {
                    Some(raw) => parse_generation(&raw),
                    None => Ok(seed),
                }
            })
            .await
    }

    /// Cache key for a list page, or `None` when the page must bypass the cache.
    async fn list_key(
        &self,
        page: PageRequest,
        deadline: Deadline,
        warnings: &mut Vec<CacheWarning>,
    ) -> Option<String> {
        if !self.cache.is_enabled() {
            return None;
        }
        match self.policy.invalidation {
            CollectionInvalidation::Sweep => Some(cache_keys::users_list(page)),
            CollectionInvalidation::Generation => match self.current_generation(deadline).await {
                Ok(generation) => Some(cache_keys::users_list_generation(generation, page)),
                Err(err) => {
                    Self::record_warning(warnings, CacheOp::Read, cache_keys::USERS_LIST_GENERATION, &err);
                    None
                }
            },
        }
    }

    async fn load_active(&self, id: UserId, deadline: Deadline) -> StrataResult<User> {
        self.policy
            .timeouts
            .store_call(deadline, || self.user_dao.find_active_by_id(id))
            .await?
            .ok_or_else(|| StrataError::not_found("User", id))
    }
}

/// Starting value for a fresh generation counter. Wall-clock millis keep
/// generations increasing even after an expired counter is re-created.
fn generation_seed() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn parse_generation(raw: &str) -> StrataResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| StrataError::Serialization(format!("list generation is not an integer: {raw}")))
}

#[async_trait]
impl UserRepository for CachedUserRepository {
    async fn fetch_one(&self, id: UserId, deadline: Deadline) -> StrataResult<Outcome<User>> {
        debug!(user_id = %id, "Repository: fetch_one");
        let key = cache_keys::user_by_id(id);
        let mut warnings = Vec::new();

        if let Some(user) = self
            .read_cached::<User>(&key, FAMILY_RECORD, deadline, &mut warnings)
            .await
        {
            return Ok(Outcome { value: user, warnings });
        }

        let user = self.load_active(id, deadline).await?;
        self.populate(&key, &user, self.policy.record_ttl, deadline, &mut warnings)
            .await;

        Ok(Outcome { value: user, warnings })
    }

    async fn fetch_page(&self, page: PageRequest, deadline: Deadline) -> StrataResult<Outcome<Vec<User>>> {
        debug!(page = page.page(), size = page.size(), "Repository: fetch_page");
        let mut warnings = Vec::new();
        let key = self.list_key(page, deadline, &mut warnings).await;

        if let Some(key) = &key {
            if let Some(users) = self
                .read_cached::<Vec<User>>(key, FAMILY_COLLECTION, deadline, &mut warnings)
                .await
            {
                return Ok(Outcome { value: users, warnings });
            }
        }

        let users = self
            .policy
            .timeouts
            .store_call(deadline, || {
                self.user_dao.find_active_page(page.limit(), page.offset())
            })
            .await?;

        if let Some(key) = &key {
            self.populate(key, &users, self.policy.list_ttl, deadline, &mut warnings)
                .await;
        }

        Ok(Outcome { value: users, warnings })
    }

    async fn create_one(&self, draft: UserDraft, deadline: Deadline) -> StrataResult<Outcome<User>> {
        debug!(email = %draft.email, "Repository: create_one");
        let timeouts = self.policy.timeouts;

        let existing = timeouts
            .store_call(deadline, || self.user_dao.find_active_by_email(&draft.email))
            .await?;
        if existing.is_some() {
            return Err(StrataError::conflict(format!(
                "User with email {} already exists",
                draft.email
            )));
        }

        let user = timeouts
            .store_call(deadline, || self.user_dao.insert(&draft))
            .await?;

        let mut warnings = Vec::new();
        let key = cache_keys::user_by_id(user.id);
        self.populate(&key, &user, self.policy.record_ttl, deadline, &mut warnings)
            .await;
        self.invalidate_collections(deadline, &mut warnings).await;

        info!(user_id = %user.id, "User created");
        Ok(Outcome { value: user, warnings })
    }

    async fn update_one(&self, id: UserId, patch: UserPatch, deadline: Deadline) -> StrataResult<Outcome<User>> {
        debug!(user_id = %id, "Repository: update_one");
        if patch.is_empty() {
            return Err(StrataError::validation("No fields to update"));
        }
        let timeouts = self.policy.timeouts;

        if let Some(email) = &patch.email {
            let holder = timeouts
                .store_call(deadline, || self.user_dao.find_active_by_email(email))
                .await?;
            if holder.is_some_and(|other| other.id != id) {
                return Err(StrataError::conflict(format!("User with email {email} already exists")));
            }
        }

        let affected = timeouts
            .store_call(deadline, || self.user_dao.update_active(id, &patch))
            .await?;
        if affected == 0 {
            return Err(StrataError::not_found("User", id));
        }

        let mut warnings = Vec::new();
        let key = cache_keys::user_by_id(id);
        self.evict(&key, deadline, &mut warnings).await;
        self.invalidate_collections(deadline, &mut warnings).await;

        // A concurrent delete can land between the write and this read.
        let user = self.load_active(id, deadline).await?;
        self.populate(&key, &user, self.policy.record_ttl, deadline, &mut warnings)
            .await;

        info!(user_id = %id, "User updated");
        Ok(Outcome { value: user, warnings })
    }

    async fn delete_one(&self, id: UserId, deadline: Deadline) -> StrataResult<Outcome<()>> {
        debug!(user_id = %id, "Repository: delete_one");
        let affected = self
            .policy
            .timeouts
            .store_call(deadline, || self.user_dao.soft_delete(id))
            .await?;
        if affected == 0 {
            return Err(StrataError::not_found("User", id));
        }

        let mut warnings = Vec::new();
        self.evict(&cache_keys::user_by_id(id), deadline, &mut warnings)
            .await;
        self.invalidate_collections(deadline, &mut warnings).await;

        info!(user_id = %id, "User deleted");
        Ok(Outcome { value: (), warnings })
    }

    async fn count_active(&self, deadline: Deadline) -> StrataResult<u64> {
        self.policy
            .timeouts
            .store_call(deadline, || self.user_dao.count_active())
            .await
    }

    async fn health(&self) -> HealthReport {
        let timeouts = self.policy.timeouts;
        let store = match timeouts.store_call(Deadline::none(), || self.user_dao.ping()).await {
            Ok(()) => HealthStatus::Healthy,
            Err(err) => HealthStatus::Unhealthy(err.to_string()),
        };
        let cache = if self.cache.is_enabled() {
            match timeouts.cache_call(Deadline::none(), || self.cache.ping()).await {
                Ok(()) => HealthStatus::Healthy,
                Err(err) => HealthStatus::Degraded(err.to_string()),
            }
        } else {
            HealthStatus::Degraded("cache disabled".to_string())
        };
        HealthReport { store, cache }
    }
}

impl std::fmt::Debug for CachedUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedUserRepository")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, RedisCacheService};
    use crate::dao::InMemoryUserDao;
    use strata_core::Email;

    fn draft(email: &str) -> UserDraft {
        UserDraft {
            email: Email::parse(email).unwrap(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    fn repository(policy: CachePolicy) -> (CachedUserRepository, MemoryCache) {
        let cache = MemoryCache::new();
        let repo = CachedUserRepository::new(
            Arc::new(InMemoryUserDao::new()),
            Arc::new(cache.clone()),
            policy,
        );
        (repo, cache)
    }

    #[test]
    fn test_policy_from_config() {
        let policy = CachePolicy::from(&CacheConfig::default());
        assert_eq!(policy.record_ttl, Duration::from_secs(3600));
        assert_eq!(policy.list_ttl, Duration::from_secs(1800));
        assert_eq!(policy.timeouts.store, Duration::from_millis(5000));
        assert_eq!(policy.timeouts.cache, Duration::from_millis(1000));
        assert_eq!(policy.invalidation, CollectionInvalidation::Sweep);
        assert_eq!(policy.generation_window(), MIN_GENERATION_WINDOW);
    }

    #[test]
    fn test_parse_generation() {
        assert_eq!(parse_generation("42").unwrap(), 42);
        assert!(matches!(parse_generation("x"), Err(StrataError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_create_populates_record_key() {
        let (repo, cache) = repository(CachePolicy::default());
        let user = repo
            .create_one(draft("ada@example.com"), Deadline::none())
            .await
            .unwrap()
            .into_value();

        let cached: Option<User> = cache.get(&cache_keys::user_by_id(user.id)).await.unwrap();
        assert_eq!(cached, Some(user));
    }

    #[tokio::test]
    async fn test_generation_keys_change_after_write() {
        let policy = CachePolicy {
            invalidation: CollectionInvalidation::Generation,
            ..CachePolicy::default()
        };
        let (repo, cache) = repository(policy);
        let page = PageRequest::normalized(1, 10);

        repo.fetch_page(page, Deadline::none()).await.unwrap();
        let before = cache.keys_matching("users:list:g*").await.unwrap();
        assert_eq!(before.len(), 1);

        repo.create_one(draft("ada@example.com"), Deadline::none())
            .await
            .unwrap();
        let outcome = repo.fetch_page(page, Deadline::none()).await.unwrap();
        assert_eq!(outcome.value.len(), 1);

        let after = cache.keys_matching("users:list:g*").await.unwrap();
        assert_eq!(after.len(), 2);
        assert!(!after.iter().all(|k| before.contains(k)));
    }

    #[tokio::test]
    async fn test_disabled_cache_reads_store_and_reports_degraded() {
        let repo = CachedUserRepository::new(
            Arc::new(InMemoryUserDao::new()),
            Arc::new(RedisCacheService::disabled()),
            CachePolicy::default(),
        );
        let created = repo
            .create_one(draft("ada@example.com"), Deadline::none())
            .await
            .unwrap();
        assert!(!created.is_degraded());

        let fetched = repo.fetch_one(created.value.id, Deadline::none()).await.unwrap();
        assert_eq!(fetched.value, created.value);

        let health = repo.health().await;
        assert!(health.is_serving());
        assert_eq!(health.cache, HealthStatus::Degraded("cache disabled".to_string()));
    }

    #[tokio::test]
    async fn test_expired_deadline_fails_store_call() {
        let (repo, _) = repository(CachePolicy::default());
        let deadline = Deadline::at(tokio::time::Instant::now() - Duration::from_millis(1));
        let err = repo.fetch_one(UserId::new(), deadline).await.unwrap_err();
        assert_eq!(err.upstream(), Some(strata_core::Upstream::Store));
    }
}
