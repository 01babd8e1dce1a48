//! End-to-end planning through the real adapters, the retrying executor, and
//! the cache facade, with a scripted transport standing in for the network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::DateTime;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use route_weather::domain::ports::{
    HttpTransport, HttpTransportError, OutboundRequest, OutboundResponse,
};
use route_weather::domain::{
    MultiRouteResponse, RetryPolicy, RetryingRequestExecutor, RouteQuery, RouteWeatherService,
};
use route_weather::outbound::cache::RouteCacheManager;
use route_weather::outbound::google_directions::GoogleDirectionsSource;
use route_weather::outbound::open_meteo::OpenMeteoWeatherSource;
use route_weather::test_support::clock::{ImmediateSleeper, MutableClock};

/// Answers by host: Google gets a directions payload, Open-Meteo a forecast.
struct ProviderDouble {
    forecast_status: u16,
    directions_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
}

impl ProviderDouble {
    fn new(forecast_status: u16) -> Self {
        Self {
            forecast_status,
            directions_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
        }
    }

    fn directions_calls(&self) -> usize {
        self.directions_calls.load(Ordering::SeqCst)
    }

    fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }
}

fn step(secs: u64, from: (f64, f64), to: (f64, f64)) -> Value {
    json!({
        "duration": {"value": secs},
        "distance": {"value": secs * 25},
        "start_location": {"lat": from.0, "lng": from.1},
        "end_location": {"lat": to.0, "lng": to.1},
        "polyline": {"points": "seg"}
    })
}

fn directions_payload() -> Value {
    json!({
        "status": "OK",
        "routes": [{
            "summary": "A64",
            "overview_polyline": {"points": "overview"},
            "legs": [{
                "start_address": "Leeds, UK",
                "end_address": "York, UK",
                "steps": [
                    step(1_200, (53.8, -1.55), (53.9, -1.3)),
                    step(1_500, (53.9, -1.3), (53.96, -1.08))
                ]
            }]
        }]
    })
}

fn forecast_payload() -> Value {
    json!({
        "hourly": {
            "time": (0..24).map(|h| format!("2026-03-01T{h:02}:00")).collect::<Vec<_>>(),
            "temperature_2m": vec![4.5; 24],
            "apparent_temperature": vec![1.0; 24],
            "precipitation": vec![1.2; 24],
            "precipitation_probability": vec![80; 24],
            "weather_code": vec![63; 24],
            "wind_speed_10m": vec![22.0; 24],
            "relative_humidity_2m": vec![91; 24]
        }
    })
}

#[async_trait]
impl HttpTransport for ProviderDouble {
    async fn send(&self, request: &OutboundRequest) -> Result<OutboundResponse, HttpTransportError> {
        match request.url.host_str() {
            Some("maps.googleapis.com") => {
                self.directions_calls.fetch_add(1, Ordering::SeqCst);
                Ok(OutboundResponse::new(200, directions_payload().to_string()))
            }
            Some("api.open-meteo.com") => {
                self.forecast_calls.fetch_add(1, Ordering::SeqCst);
                Ok(OutboundResponse::new(
                    self.forecast_status,
                    forecast_payload().to_string(),
                ))
            }
            other => Err(HttpTransportError::invalid_request(format!(
                "unexpected host {other:?}"
            ))),
        }
    }
}

struct Harness {
    providers: Arc<ProviderDouble>,
    cache: Arc<RouteCacheManager<MultiRouteResponse>>,
    service: RouteWeatherService,
}

fn harness(forecast_status: u16) -> Harness {
    let providers = Arc::new(ProviderDouble::new(forecast_status));
    let clock = Arc::new(MutableClock::at_fixed_instant());
    let executor = RetryingRequestExecutor::with_runtime(
        providers.clone(),
        Arc::new(ImmediateSleeper),
        RetryPolicy::default(),
    );
    let directions =
        GoogleDirectionsSource::new(executor.clone(), "test-key").expect("directions endpoint");
    let weather = OpenMeteoWeatherSource::new(executor).expect("weather endpoint");
    let cache = Arc::new(RouteCacheManager::<MultiRouteResponse>::with_clock(
        clock.clone(),
    ));
    let service = RouteWeatherService::new(
        cache.clone(),
        Arc::new(directions),
        Arc::new(weather),
        clock,
    );
    Harness {
        providers,
        cache,
        service,
    }
}

#[fixture]
fn healthy() -> Harness {
    harness(200)
}

fn query(origin: &str, departure: &str) -> RouteQuery {
    RouteQuery {
        origin: origin.to_owned(),
        destination: "York".to_owned(),
        departure_time: Some(DateTime::parse_from_rfc3339(departure).expect("valid timestamp")),
    }
}

#[rstest]
#[tokio::test]
async fn plans_samples_and_forecasts_each_waypoint(healthy: Harness) {
    let response = healthy
        .service
        .plan(&query("Leeds", "2026-03-01T08:10:00+00:00"))
        .await
        .expect("planning succeeds");

    assert_eq!(response.origin_address, "Leeds, UK");
    assert_eq!(response.routes.len(), 1);
    let route = &response.routes[0];
    assert_eq!(route.total_duration_minutes, 45);
    let minutes = route
        .waypoints
        .iter()
        .map(|w| w.minutes_from_start)
        .collect::<Vec<_>>();
    assert_eq!(minutes, vec![0, 45]);
    assert!(route.waypoints.iter().all(|w| {
        w.weather
            .as_ref()
            .is_some_and(|weather| weather.weather_description == "Moderate rain")
    }));
    assert_eq!(healthy.providers.directions_calls(), 1);
    assert_eq!(healthy.providers.forecast_calls(), 2);
}

#[rstest]
#[tokio::test]
async fn equivalent_queries_are_served_from_cache(healthy: Harness) {
    let first = healthy
        .service
        .plan(&query("Leeds", "2026-03-01T08:10:00+00:00"))
        .await
        .expect("first plan");
    let second = healthy
        .service
        .plan(&query("  LEEDS ", "2026-03-01T08:55:00+00:00"))
        .await
        .expect("second plan");

    assert_eq!(first, second);
    assert_eq!(healthy.providers.directions_calls(), 1);
    assert_eq!(healthy.providers.forecast_calls(), 2);
}

#[rstest]
#[tokio::test]
async fn a_new_departure_hour_misses_the_cache(healthy: Harness) {
    healthy
        .service
        .plan(&query("Leeds", "2026-03-01T08:10:00+00:00"))
        .await
        .expect("first plan");
    healthy
        .service
        .plan(&query("Leeds", "2026-03-01T09:10:00+00:00"))
        .await
        .expect("second plan");

    assert_eq!(healthy.providers.directions_calls(), 2);
}

#[rstest]
#[tokio::test]
async fn clearing_the_facade_forces_a_refetch(healthy: Harness) {
    use route_weather::domain::ports::RouteCache;

    let q = query("Leeds", "2026-03-01T08:10:00+00:00");
    healthy.service.plan(&q).await.expect("first plan");
    healthy.cache.clear().await.expect("clear");
    healthy.cache.clear().await.expect("clear is idempotent");
    healthy.service.plan(&q).await.expect("second plan");

    assert_eq!(healthy.providers.directions_calls(), 2);
}

#[tokio::test]
async fn unavailable_weather_leaves_waypoints_empty_after_retries() {
    let harness = harness(503);

    let response = harness
        .service
        .plan(&query("Leeds", "2026-03-01T08:10:00+00:00"))
        .await
        .expect("weather failures do not fail planning");

    assert!(
        response.routes[0]
            .waypoints
            .iter()
            .all(|w| w.weather.is_none())
    );
    // Two waypoints, three attempts each.
    assert_eq!(harness.providers.forecast_calls(), 6);
}
