//! Route cache facade with runtime backend selection.
//!
//! The manager always has a working backend: it starts with an in-process
//! store and [`RouteCacheManager::configure`] only ever swaps in Redis after
//! the server has answered a `PING`. Every other failure during selection
//! degrades to the in-process store with a warning.
//!
//! The active backend sits behind an `RwLock` that is held only long enough
//! to clone its `Arc`, so a swap never waits for in-flight cache calls and
//! those calls finish against the backend they started with.

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::memory::MemoryRouteCache;
use super::redis::RedisRouteCache;
use super::settings::RouteCacheSettings;
use crate::domain::ports::{RouteCache, RouteCacheError, RouteCacheKey};

/// Which backend is serving cache calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheBackendKind {
    /// Per-process LRU store.
    Memory,
    /// Shared Redis store.
    Redis,
}

impl CacheBackendKind {
    /// Configuration name of the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Redis => "redis",
        }
    }

    /// Name of the adapter type serving this backend.
    pub fn adapter_name(self) -> &'static str {
        match self {
            Self::Memory => "MemoryRouteCache",
            Self::Redis => "RedisRouteCache",
        }
    }
}

impl std::fmt::Display for CacheBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheBackendKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(()),
        }
    }
}

struct ActiveBackend<P> {
    kind: CacheBackendKind,
    cache: Arc<dyn RouteCache<Plan = P>>,
}

impl<P> Clone for ActiveBackend<P> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            cache: Arc::clone(&self.cache),
        }
    }
}

/// Facade delegating to whichever route cache backend is active.
///
/// `get` and `put` never fail: a backend fault is logged and reported as a
/// miss or a dropped write so callers can always fall through to the
/// upstream providers. `clear` and `close` surface backend errors.
pub struct RouteCacheManager<P> {
    active: RwLock<ActiveBackend<P>>,
    clock: Arc<dyn Clock>,
}

impl<P> RouteCacheManager<P>
where
    P: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Start with a default in-process store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Start with a default in-process store stamped by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let cache: Arc<dyn RouteCache<Plan = P>> = Arc::new(MemoryRouteCache::new(clock.clone()));
        Self {
            active: RwLock::new(ActiveBackend {
                kind: CacheBackendKind::Memory,
                cache,
            }),
            clock,
        }
    }

    /// Select a backend from `settings`, install it, then close the old one.
    ///
    /// Never fails: an unusable Redis configuration installs an in-process
    /// store instead.
    pub async fn configure(&self, settings: &RouteCacheSettings) {
        let next = self.build_backend(settings).await;
        let kind = next.kind;
        let previous = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *active, next)
        };

        if let Err(error) = previous.cache.close().await {
            warn!(backend = %previous.kind, %error, "closing previous route cache backend failed");
        }
        info!(backend = %kind, "route cache backend configured");
    }

    /// Kind of the active backend.
    pub fn backend_kind(&self) -> CacheBackendKind {
        self.current().kind
    }

    /// Adapter name of the active backend, for diagnostics.
    pub fn backend_name(&self) -> &'static str {
        self.backend_kind().adapter_name()
    }

    fn current(&self) -> ActiveBackend<P> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn memory_backend(&self, settings: &RouteCacheSettings) -> ActiveBackend<P> {
        ActiveBackend {
            kind: CacheBackendKind::Memory,
            cache: Arc::new(MemoryRouteCache::with_limits(
                settings.ttl(),
                settings.max_entries(),
                self.clock.clone(),
            )),
        }
    }

    async fn build_backend(&self, settings: &RouteCacheSettings) -> ActiveBackend<P> {
        if settings.backend_kind() == CacheBackendKind::Memory {
            return self.memory_backend(settings);
        }

        let Some(url) = settings.redis_url() else {
            warn!("redis route cache requested but no redis url is set; using memory");
            return self.memory_backend(settings);
        };

        let redis = match RedisRouteCache::<P>::connect(url, settings.ttl()).await {
            Ok(redis) => redis,
            Err(error) => {
                warn!(%error, "redis route cache unavailable; using memory");
                return self.memory_backend(settings);
            }
        };
        if let Err(error) = redis.ping().await {
            warn!(%error, "redis route cache unreachable; using memory");
            return self.memory_backend(settings);
        }

        info!("using redis route cache backend");
        ActiveBackend {
            kind: CacheBackendKind::Redis,
            cache: Arc::new(redis),
        }
    }
}

impl<P> Default for RouteCacheManager<P>
where
    P: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P> RouteCache for RouteCacheManager<P>
where
    P: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Plan = P;

    async fn get(&self, key: &RouteCacheKey) -> Result<Option<P>, RouteCacheError> {
        let backend = self.current();
        match backend.cache.get(key).await {
            Ok(plan) => Ok(plan),
            Err(error) => {
                warn!(backend = %backend.kind, %key, %error, "route cache read failed; treating as miss");
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &RouteCacheKey, plan: &P) -> Result<(), RouteCacheError> {
        let backend = self.current();
        if let Err(error) = backend.cache.put(key, plan).await {
            warn!(backend = %backend.kind, %key, %error, "route cache write failed; dropping entry");
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), RouteCacheError> {
        self.current().cache.clear().await
    }

    async fn close(&self) -> Result<(), RouteCacheError> {
        self.current().cache.close().await
    }
}

#[cfg(test)]
mod tests {
    //! Backend selection and failure absorption.
    use super::*;
    use crate::test_support::clock::MutableClock;
    use rstest::rstest;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn key(name: &str) -> RouteCacheKey {
        RouteCacheKey::new(name).expect("valid key")
    }

    fn redis_settings(url: Option<&str>) -> RouteCacheSettings {
        RouteCacheSettings {
            backend: Some("redis".to_owned()),
            redis_url: url.map(str::to_owned),
            ..RouteCacheSettings::default()
        }
    }

    /// Backend that fails every call and records whether it was closed.
    #[derive(Default)]
    struct BrokenCache {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl RouteCache for BrokenCache {
        type Plan = String;

        async fn get(&self, _key: &RouteCacheKey) -> Result<Option<String>, RouteCacheError> {
            Err(RouteCacheError::backend("connection reset"))
        }

        async fn put(&self, _key: &RouteCacheKey, _plan: &String) -> Result<(), RouteCacheError> {
            Err(RouteCacheError::backend("connection reset"))
        }

        async fn clear(&self) -> Result<(), RouteCacheError> {
            Err(RouteCacheError::backend("connection reset"))
        }

        async fn close(&self) -> Result<(), RouteCacheError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager_with(cache: Arc<dyn RouteCache<Plan = String>>) -> RouteCacheManager<String> {
        let manager = RouteCacheManager::new();
        *manager.active.write().expect("lock") = ActiveBackend {
            kind: CacheBackendKind::Redis,
            cache,
        };
        manager
    }

    #[tokio::test]
    async fn starts_with_memory_backend() {
        let manager = RouteCacheManager::<String>::new();
        assert_eq!(manager.backend_kind(), CacheBackendKind::Memory);
        assert_eq!(manager.backend_name(), "MemoryRouteCache");

        manager.put(&key("a"), &"alpha".to_owned()).await.expect("put");
        assert_eq!(manager.get(&key("a")).await.expect("get"), Some("alpha".to_owned()));
    }

    #[rstest]
    #[case::missing_url(redis_settings(None))]
    #[case::blank_url(redis_settings(Some("  ")))]
    #[case::invalid_url(redis_settings(Some("not a redis url")))]
    #[case::unreachable_server(redis_settings(Some("redis://127.0.0.1:1")))]
    #[tokio::test]
    async fn unusable_redis_falls_back_to_memory(#[case] settings: RouteCacheSettings) {
        let manager = RouteCacheManager::<String>::new();
        manager.configure(&settings).await;

        assert_eq!(manager.backend_kind(), CacheBackendKind::Memory);
        manager.put(&key("a"), &"alpha".to_owned()).await.expect("put");
        assert_eq!(manager.get(&key("a")).await.expect("get"), Some("alpha".to_owned()));
    }

    #[tokio::test]
    async fn configure_applies_memory_limits() {
        let clock = Arc::new(MutableClock::at_fixed_instant());
        let manager = RouteCacheManager::<String>::with_clock(clock.clone());
        manager
            .configure(&RouteCacheSettings {
                ttl_secs: Some(10),
                max_entries: Some(1),
                ..RouteCacheSettings::default()
            })
            .await;

        manager.put(&key("a"), &"alpha".to_owned()).await.expect("put");
        manager.put(&key("b"), &"beta".to_owned()).await.expect("put");
        assert_eq!(manager.get(&key("a")).await.expect("get"), None);

        clock.advance_seconds(11);
        assert_eq!(manager.get(&key("b")).await.expect("get"), None);
    }

    #[tokio::test]
    async fn reconfigure_installs_new_backend_and_closes_old() {
        let closed = Arc::new(AtomicBool::new(false));
        let manager = manager_with(Arc::new(BrokenCache {
            closed: closed.clone(),
        }));

        manager.configure(&RouteCacheSettings::default()).await;

        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(manager.backend_kind(), CacheBackendKind::Memory);
    }

    #[tokio::test]
    async fn swap_drops_previous_entries() {
        let manager = RouteCacheManager::<String>::new();
        manager.put(&key("a"), &"alpha".to_owned()).await.expect("put");
        manager.configure(&RouteCacheSettings::default()).await;
        assert_eq!(manager.get(&key("a")).await.expect("get"), None);
    }

    #[tokio::test]
    async fn backend_read_and_write_failures_are_absorbed() {
        let manager = manager_with(Arc::new(BrokenCache::default()));

        assert_eq!(manager.get(&key("a")).await.expect("get absorbs"), None);
        manager
            .put(&key("a"), &"alpha".to_owned())
            .await
            .expect("put absorbs");
        let error = manager.clear().await.expect_err("clear propagates");
        assert_eq!(error, RouteCacheError::backend("connection reset"));
        assert_eq!(manager.backend_kind(), CacheBackendKind::Redis);
    }

    #[tokio::test]
    async fn in_flight_calls_finish_on_their_backend() {
        let manager = RouteCacheManager::<String>::new();
        let before = manager.current();
        manager.configure(&RouteCacheSettings::default()).await;

        before
            .cache
            .put(&key("a"), &"alpha".to_owned())
            .await
            .expect("old backend still answers");
        assert_eq!(manager.get(&key("a")).await.expect("get"), None);
    }

    #[rstest]
    #[case("memory", Ok(CacheBackendKind::Memory))]
    #[case("REDIS", Ok(CacheBackendKind::Redis))]
    #[case("sqlite", Err(()))]
    fn kinds_parse_case_insensitively(
        #[case] raw: &str,
        #[case] expected: Result<CacheBackendKind, ()>,
    ) {
        assert_eq!(raw.parse::<CacheBackendKind>(), expected);
    }
}
