//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod directions_source;
mod http_transport;
mod route_cache;
mod weather_source;

pub use cache_key::{RouteCacheKey, RouteCacheKeyValidationError};
#[cfg(test)]
pub use directions_source::MockDirectionsSource;
pub use directions_source::{
    DirectionsResult, DirectionsRoute, DirectionsSource, DirectionsSourceError, RouteStep,
};
#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{
    HttpMethod, HttpTransport, HttpTransportError, OutboundRequest, OutboundResponse,
    RequestOptions,
};
pub use route_cache::{RouteCache, RouteCacheError};
#[cfg(test)]
pub use weather_source::MockWeatherSource;
pub use weather_source::{WeatherSource, WeatherSourceError};
