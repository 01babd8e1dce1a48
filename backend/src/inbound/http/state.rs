//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data`, so they only see the
//! route-weather service and the cache facade and stay testable without
//! network I/O.

use std::sync::Arc;

use crate::domain::{MultiRouteResponse, RouteWeatherService};
use crate::outbound::cache::RouteCacheManager;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Answers route queries.
    pub routes: RouteWeatherService,
    /// Cache facade, exposed for diagnostics.
    pub cache: Arc<RouteCacheManager<MultiRouteResponse>>,
}

impl HttpState {
    /// Bundle the service and the cache facade it writes through.
    pub fn new(
        routes: RouteWeatherService,
        cache: Arc<RouteCacheManager<MultiRouteResponse>>,
    ) -> Self {
        Self { routes, cache }
    }
}
