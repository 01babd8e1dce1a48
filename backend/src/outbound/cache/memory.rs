//! In-process route cache with LRU eviction and lazy TTL expiry.
//!
//! Entries are stamped with the injected clock when written. A read that finds
//! an entry older than the TTL removes it and reports a miss; there is no
//! background sweeper. The map never holds more than `max_entries` items: each
//! write evicts the least recently used entry once the bound is reached.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use mockable::Clock;

use crate::domain::ports::{RouteCache, RouteCacheError, RouteCacheKey};

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default capacity.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

struct CacheEntry<P> {
    plan: P,
    created_at: DateTime<Utc>,
}

/// Bounded in-process [`RouteCache`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use mockable::DefaultClock;
/// use route_weather::outbound::cache::MemoryRouteCache;
///
/// let cache = MemoryRouteCache::<String>::new(Arc::new(DefaultClock));
/// assert!(cache.is_empty());
/// ```
pub struct MemoryRouteCache<P> {
    entries: Mutex<LruCache<RouteCacheKey, CacheEntry<P>>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<P> MemoryRouteCache<P> {
    /// Build a cache with [`DEFAULT_TTL`] and [`DEFAULT_MAX_ENTRIES`].
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_MAX_ENTRIES, clock)
    }

    /// Build a cache with explicit limits. A zero capacity is raised to one.
    pub fn with_limits(ttl: Duration, max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    /// Number of stored entries, including expired ones not yet read.
    ///
    /// Still answers after a panic poisoned the lock.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cap()
            .get()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<RouteCacheKey, CacheEntry<P>>>, RouteCacheError> {
        self.entries
            .lock()
            .map_err(|_| RouteCacheError::backend("in-memory route cache lock poisoned"))
    }
}

#[async_trait]
impl<P> RouteCache for MemoryRouteCache<P>
where
    P: Clone + Send + Sync + 'static,
{
    type Plan = P;

    async fn get(&self, key: &RouteCacheKey) -> Result<Option<P>, RouteCacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;

        let expired = match entries.peek(key) {
            Some(entry) => now - entry.created_at > self.ttl,
            None => return Ok(None),
        };
        if expired {
            entries.pop(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.plan.clone()))
    }

    async fn put(&self, key: &RouteCacheKey, plan: &P) -> Result<(), RouteCacheError> {
        let entry = CacheEntry {
            plan: plan.clone(),
            created_at: self.clock.utc(),
        };
        self.lock()?.put(key.clone(), entry);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RouteCacheError> {
        self.lock()?.clear();
        Ok(())
    }
}
