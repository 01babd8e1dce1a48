//! Route-weather orchestration.
//!
//! [`RouteWeatherService`] answers one route query by consulting the response
//! cache, and on a miss fetching directions, sampling waypoints along every
//! alternative, and fetching a forecast for each waypoint. The assembled
//! response is written back to the cache before it is returned.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeDelta};
use futures_util::future::join_all;
use mockable::Clock;
use tracing::{debug, info, warn};

use super::Error;
use super::ports::{
    DirectionsRoute, DirectionsSource, DirectionsSourceError, RouteCache, RouteCacheKey,
    WeatherSource,
};

mod model;

pub use model::{
    LatLng, MultiRouteResponse, RouteRecommendation, RouteWithWeather, Waypoint, WeatherData,
};

/// Default spacing between sampled waypoints.
pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// A validated route query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuery {
    /// Free-text origin.
    pub origin: String,
    /// Free-text destination.
    pub destination: String,
    /// Planned departure; `None` means "now".
    pub departure_time: Option<DateTime<FixedOffset>>,
}

/// Cache handle holding whole route responses.
pub type RouteResponseCache = Arc<dyn RouteCache<Plan = MultiRouteResponse>>;

/// Answers route queries from the cache or from the upstream providers.
#[derive(Clone)]
pub struct RouteWeatherService {
    cache: RouteResponseCache,
    directions: Arc<dyn DirectionsSource>,
    weather: Arc<dyn WeatherSource>,
    clock: Arc<dyn Clock>,
    sampling_interval: Duration,
}

impl RouteWeatherService {
    /// Build a service sampling waypoints every
    /// [`DEFAULT_SAMPLING_INTERVAL`].
    pub fn new(
        cache: RouteResponseCache,
        directions: Arc<dyn DirectionsSource>,
        weather: Arc<dyn WeatherSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cache,
            directions,
            weather,
            clock,
            sampling_interval: DEFAULT_SAMPLING_INTERVAL,
        }
    }

    /// Override the waypoint sampling interval. Zero is treated as one second.
    #[must_use]
    pub fn with_sampling_interval(mut self, interval: Duration) -> Self {
        self.sampling_interval = interval.max(Duration::from_secs(1));
        self
    }

    /// Resolve `query` to every route alternative annotated with weather.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] when the directions provider fails, refuses the
    /// query, or finds no route. Weather and cache failures never fail the
    /// query: missing forecasts are left empty and cache faults are logged.
    pub async fn plan(&self, query: &RouteQuery) -> Result<MultiRouteResponse, Error> {
        let key = RouteCacheKey::for_route(
            &query.origin,
            &query.destination,
            query.departure_time.as_ref(),
        );

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!(%key, "route cache hit");
                return Ok(cached);
            }
            Ok(None) => debug!(%key, "route cache miss"),
            Err(error) => warn!(%key, %error, "route cache read failed; treating as miss"),
        }

        info!(
            origin = %query.origin,
            destination = %query.destination,
            "fetching directions"
        );
        let directions = self
            .directions
            .fetch_routes(&query.origin, &query.destination)
            .await
            .map_err(map_directions_error)?;

        let departure = query
            .departure_time
            .unwrap_or_else(|| self.clock.utc().fixed_offset());
        let mut routes = directions
            .routes
            .iter()
            .enumerate()
            .map(|(index, route)| self.annotate(index, route, departure))
            .collect::<Vec<_>>();
        self.attach_weather(&mut routes).await;

        let response = MultiRouteResponse {
            origin_address: directions.origin_address,
            destination_address: directions.destination_address,
            routes,
            recommendation: None,
        };

        if let Err(error) = self.cache.put(&key, &response).await {
            warn!(%key, %error, "route cache write failed");
        }
        Ok(response)
    }

    fn annotate(
        &self,
        route_index: usize,
        route: &DirectionsRoute,
        departure: DateTime<FixedOffset>,
    ) -> RouteWithWeather {
        let waypoints = sample_offsets(route, self.sampling_interval)
            .into_iter()
            .map(|(location, elapsed_secs)| Waypoint {
                location,
                minutes_from_start: seconds_to_minutes(elapsed_secs),
                estimated_time: offset_time(departure, elapsed_secs),
                weather: None,
            })
            .collect();

        RouteWithWeather {
            route_index,
            overview_polyline: route.overview_polyline.clone(),
            summary: route.summary.clone(),
            total_duration_minutes: seconds_to_minutes(route.total_duration_seconds),
            total_distance_km: metres_to_km(route.total_distance_meters),
            waypoints,
        }
    }

    async fn attach_weather(&self, routes: &mut [RouteWithWeather]) {
        let lookups = routes
            .iter()
            .flat_map(|route| route.waypoints.iter())
            .map(|waypoint| {
                self.weather
                    .fetch_weather(waypoint.location, waypoint.estimated_time)
            })
            .collect::<Vec<_>>();
        let mut results = join_all(lookups).await.into_iter();

        for waypoint in routes.iter_mut().flat_map(|route| route.waypoints.iter_mut()) {
            match results.next() {
                Some(Ok(weather)) => waypoint.weather = Some(weather),
                Some(Err(error)) => warn!(
                    lat = waypoint.location.lat,
                    lng = waypoint.location.lng,
                    %error,
                    "weather fetch failed; leaving waypoint without forecast"
                ),
                None => break,
            }
        }
    }
}

fn map_directions_error(error: DirectionsSourceError) -> Error {
    match error {
        DirectionsSourceError::Rejected { status } => {
            Error::invalid_request(format!("Directions API error: {status}"))
        }
        DirectionsSourceError::NoRoutes => Error::not_found("No routes found"),
        DirectionsSourceError::Upstream { message } => {
            Error::bad_gateway(format!("directions provider unavailable: {message}"))
        }
        DirectionsSourceError::Decode { message } => {
            Error::bad_gateway(format!("directions provider returned bad data: {message}"))
        }
    }
}

/// Pick the points along `route` that receive a forecast.
///
/// Returns the route start, the end of every step that crosses the next
/// sampling boundary, and the destination, each with its elapsed seconds.
/// Points are in travel order.
fn sample_offsets(route: &DirectionsRoute, interval: Duration) -> Vec<(LatLng, u64)> {
    let Some(first) = route.steps.first() else {
        return Vec::new();
    };
    let interval_secs = interval.as_secs().max(1);

    let mut samples = vec![(first.start_location, 0_u64)];
    let mut elapsed = 0_u64;
    let mut next_boundary = interval_secs;
    let mut destination_sampled = false;
    for step in &route.steps {
        elapsed = elapsed.saturating_add(step.duration_seconds);
        destination_sampled = elapsed >= next_boundary;
        if destination_sampled {
            samples.push((step.end_location, elapsed));
            next_boundary = (elapsed / interval_secs)
                .saturating_add(1)
                .saturating_mul(interval_secs);
        }
    }

    if !destination_sampled {
        if let Some(last) = route.steps.last() {
            samples.push((last.end_location, elapsed));
        }
    }
    samples
}

fn seconds_to_minutes(seconds: u64) -> i64 {
    i64::try_from(seconds.saturating_add(30) / 60).unwrap_or(i64::MAX)
}

fn offset_time(departure: DateTime<FixedOffset>, seconds: u64) -> DateTime<FixedOffset> {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| departure.checked_add_signed(delta))
        .unwrap_or(departure)
}

fn metres_to_km(metres: u64) -> f64 {
    (metres as f64 / 100.0).round() / 10.0
}
