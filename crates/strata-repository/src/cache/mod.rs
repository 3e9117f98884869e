//! Cache adapters.
//!
//! [`CacheInterface`] is the key-value contract the repository and the
//! rate limiter share. [`RedisCacheService`] backs it with a Redis pool
//! (or acts as a disabled cache without one); [`MemoryCache`] keeps
//! everything in process.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::{glob_match, MemoryCache, MemoryCacheParameters};
pub use redis_cache::{create_redis_pool, RedisCacheService, RedisCacheServiceParameters, DEFAULT_SCAN_COUNT};
