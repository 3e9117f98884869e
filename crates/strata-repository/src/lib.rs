//! # Strata Repository
//!
//! Data access for user records, layered as:
//!
//! ```text
//! Service
//!   ↓  Arc<dyn UserRepository>   (repository interface)
//! CachedUserRepository           (read-through, write-invalidate)
//!   ↓  Arc<dyn UserDao>           ↓  Arc<dyn CacheInterface>
//! PostgresUserDao / InMemoryUserDao   RedisCacheService / MemoryCache
//!   ↓                                 ↓
//! Postgres                           Redis
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   traits.rs                    ← UserRepository trait
//!   outcome.rs                   ← Outcome + CacheWarning side channel
//!   metrics.rs                   ← cache hit/miss/warning counters
//!   pool.rs                      ← Postgres pool + migrations
//!   impl/
//!     cached_user_repository.rs  ← CachedUserRepository
//!   dao/
//!     user_dao.rs                ← UserDao trait
//!     impl/
//!       postgres.rs              ← PostgresUserDao
//!       memory.rs                ← InMemoryUserDao
//!   cache/
//!     cache_interface.rs         ← CacheInterface + CacheExt
//!     cache_keys.rs              ← key conventions
//!     redis_cache.rs             ← RedisCacheService
//!     memory_cache.rs            ← MemoryCache
//! ```

pub mod cache;
pub mod dao;
pub mod metrics;
pub mod outcome;
pub mod pool;
pub mod traits;
pub mod r#impl;

pub use cache::{create_redis_pool, CacheExt, CacheInterface, MemoryCache, RedisCacheService, RedisCacheServiceParameters};
pub use dao::{InMemoryUserDao, PostgresUserDao, UserDao};
pub use outcome::*;
pub use pool::*;
pub use traits::*;
pub use r#impl::{CachePolicy, CachedUserRepository, CachedUserRepositoryParameters};
