//! Behavioural tests for the route cache facade driven by environment
//! configuration.

use std::ffi::OsString;
use std::sync::Arc;

use env_lock::lock_env;
use ortho_config::OrthoConfig;
use rstest::{fixture, rstest};

use route_weather::domain::ports::{RouteCache, RouteCacheKey};
use route_weather::outbound::cache::{CacheBackendKind, RouteCacheManager, RouteCacheSettings};
use route_weather::test_support::clock::MutableClock;

fn settings_from_env(vars: [(&str, Option<&str>); 4]) -> RouteCacheSettings {
    let _guard = lock_env(vars.map(|(name, value)| (name, value.map(str::to_owned))));
    RouteCacheSettings::load_from_iter([OsString::from("route-weather")])
        .expect("settings should load")
}

fn key(origin: &str) -> RouteCacheKey {
    RouteCacheKey::for_route(origin, "York", None)
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::at_fixed_instant())
}

#[rstest]
#[case::missing_url([
    ("ROUTE_CACHE_BACKEND", Some("redis")),
    ("ROUTE_CACHE_REDIS_URL", None),
    ("ROUTE_CACHE_TTL_SECS", None),
    ("ROUTE_CACHE_MAX_ENTRIES", None),
])]
#[case::unreachable_server([
    ("ROUTE_CACHE_BACKEND", Some("redis")),
    ("ROUTE_CACHE_REDIS_URL", Some("redis://127.0.0.1:1/0")),
    ("ROUTE_CACHE_TTL_SECS", None),
    ("ROUTE_CACHE_MAX_ENTRIES", None),
])]
#[case::malformed_url([
    ("ROUTE_CACHE_BACKEND", Some("redis")),
    ("ROUTE_CACHE_REDIS_URL", Some("::not a url::")),
    ("ROUTE_CACHE_TTL_SECS", None),
    ("ROUTE_CACHE_MAX_ENTRIES", None),
])]
#[tokio::test]
async fn unusable_redis_configuration_keeps_serving_from_memory(
    #[case] vars: [(&str, Option<&str>); 4],
    clock: Arc<MutableClock>,
) {
    let settings = settings_from_env(vars);
    let manager = RouteCacheManager::<String>::with_clock(clock);

    manager.configure(&settings).await;

    assert_eq!(manager.backend_kind(), CacheBackendKind::Memory);
    manager
        .put(&key("Leeds"), &"plan".to_owned())
        .await
        .expect("memory put");
    assert_eq!(
        manager.get(&key("Leeds")).await.expect("memory get"),
        Some("plan".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn configured_limits_govern_expiry_and_eviction(clock: Arc<MutableClock>) {
    let settings = settings_from_env([
        ("ROUTE_CACHE_BACKEND", Some("memory")),
        ("ROUTE_CACHE_REDIS_URL", None),
        ("ROUTE_CACHE_TTL_SECS", Some("60")),
        ("ROUTE_CACHE_MAX_ENTRIES", Some("2")),
    ]);
    let manager = RouteCacheManager::<String>::with_clock(clock.clone());
    manager.configure(&settings).await;

    for origin in ["Leeds", "Hull", "Selby"] {
        manager
            .put(&key(origin), &origin.to_owned())
            .await
            .expect("put");
    }
    assert_eq!(manager.get(&key("Leeds")).await.expect("get"), None);
    assert_eq!(
        manager.get(&key("Selby")).await.expect("get"),
        Some("Selby".to_owned())
    );

    clock.advance_seconds(60);
    assert_eq!(
        manager.get(&key("Hull")).await.expect("get"),
        Some("Hull".to_owned()),
        "entries live for exactly the ttl"
    );
    clock.advance_seconds(1);
    assert_eq!(manager.get(&key("Hull")).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn closing_the_facade_is_safe_to_repeat(clock: Arc<MutableClock>) {
    let manager = RouteCacheManager::<String>::with_clock(clock);
    manager.close().await.expect("first close");
    manager.close().await.expect("second close");
}
