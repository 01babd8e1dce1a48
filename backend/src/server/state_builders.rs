//! Builders wiring outbound adapters into the HTTP handler state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::warn;

use route_weather::domain::{MultiRouteResponse, RetryingRequestExecutor, RouteWeatherService};
use route_weather::inbound::http::state::HttpState;
use route_weather::outbound::cache::RouteCacheManager;
use route_weather::outbound::google_directions::GoogleDirectionsSource;
use route_weather::outbound::http::ReqwestTransport;
use route_weather::outbound::open_meteo::OpenMeteoWeatherSource;

use super::ServerSettings;

/// Build the route-weather service over the live providers and `cache`.
///
/// Both providers share one reqwest client and one retrying executor.
///
/// # Errors
/// Returns [`std::io::Error`] when the HTTP client or a provider endpoint
/// cannot be constructed.
pub fn build_http_state(
    settings: &ServerSettings,
    cache: Arc<RouteCacheManager<MultiRouteResponse>>,
) -> std::io::Result<HttpState> {
    let transport = ReqwestTransport::new(settings.upstream_timeout())
        .map_err(|e| std::io::Error::other(format!("http client build failed: {e}")))?;
    let executor = RetryingRequestExecutor::new(Arc::new(transport));

    let api_key = settings.google_maps_api_key().unwrap_or_else(|| {
        warn!("no Google Maps API key configured; directions lookups will be refused");
        ""
    });
    let directions = GoogleDirectionsSource::new(executor.clone(), api_key)
        .map_err(|e| std::io::Error::other(format!("directions endpoint invalid: {e}")))?;
    let weather = OpenMeteoWeatherSource::new(executor)
        .map_err(|e| std::io::Error::other(format!("weather endpoint invalid: {e}")))?;

    let service = RouteWeatherService::new(
        cache.clone(),
        Arc::new(directions),
        Arc::new(weather),
        Arc::new(DefaultClock),
    );
    Ok(HttpState::new(service, cache))
}
