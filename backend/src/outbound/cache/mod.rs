//! Route cache adapters.
//!
//! Two backends implement the [`RouteCache`](crate::domain::ports::RouteCache)
//! port:
//!
//! - [`MemoryRouteCache`]: bounded, per-process LRU map with lazy TTL expiry.
//! - [`RedisRouteCache`]: shared Redis store reached through a `bb8` pool,
//!   holding JSON documents under namespaced keys (`route:v1:<sha256>`).
//!
//! [`RouteCacheManager`] selects one of them from [`RouteCacheSettings`] and
//! falls back to the in-process store whenever Redis is unusable.

mod manager;
mod memory;
mod redis;
mod settings;

pub use manager::{CacheBackendKind, RouteCacheManager};
pub use memory::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL, MemoryRouteCache};
pub use redis::{REDIS_KEY_PREFIX, RedisRouteCache};
pub use settings::RouteCacheSettings;
