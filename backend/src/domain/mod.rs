//! Domain types, ports, and services.
//!
//! Nothing here knows about HTTP frameworks, Redis, or reqwest. Inbound
//! adapters call [`RouteWeatherService`]; outbound adapters implement the
//! traits in [`ports`].

pub mod error;
pub mod ports;
pub mod request_retry;
pub mod route_weather;
pub mod trace_id;

pub use self::error::{Error, ErrorCode};
pub use self::request_retry::{
    DEFAULT_BACKOFF_SCHEDULE, DEFAULT_RETRYABLE_STATUSES, RetryPolicy, RetrySleeper,
    RetryingRequestExecutor, TokioSleeper,
};
pub use self::route_weather::{
    DEFAULT_SAMPLING_INTERVAL, LatLng, MultiRouteResponse, RouteQuery, RouteResponseCache,
    RouteWeatherService, RouteWithWeather, Waypoint, WeatherData,
};
pub use self::trace_id::{REQUEST_ID_HEADER, TRACE_ID_HEADER, TraceId, TraceIdSource};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use route_weather::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
