//! Driven port for fetching driving directions.
//!
//! The adapter flattens provider legs and steps into [`DirectionsRoute`] so
//! the route-weather service can sample waypoints without knowing the
//! provider's wire format.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::LatLng;

/// One navigation step within a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    /// Step travel time in seconds.
    pub duration_seconds: u64,
    /// Step length in metres.
    pub distance_meters: u64,
    /// Where the step begins.
    pub start_location: LatLng,
    /// Where the step ends.
    pub end_location: LatLng,
    /// Encoded polyline for the step.
    pub polyline: String,
}

/// One route alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    /// Encoded overview polyline.
    pub overview_polyline: String,
    /// Provider summary (usually the main road names).
    pub summary: String,
    /// Sum of step durations in seconds.
    pub total_duration_seconds: u64,
    /// Sum of step distances in metres.
    pub total_distance_meters: u64,
    /// Steps across every leg, in travel order.
    pub steps: Vec<RouteStep>,
}

/// Directions for an origin/destination pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsResult {
    /// Resolved origin address from the first leg.
    pub origin_address: String,
    /// Resolved destination address from the last leg.
    pub destination_address: String,
    /// Route alternatives; never empty.
    pub routes: Vec<DirectionsRoute>,
}

define_port_error! {
    /// Errors surfaced while fetching directions.
    pub enum DirectionsSourceError {
        /// The provider could not be reached or answered with a failure status.
        Upstream { message: String } => "directions upstream failed: {message}",
        /// The provider answered but refused the query.
        Rejected { status: String } => "directions API error: {status}",
        /// The provider found no route between the two places.
        NoRoutes => "no routes found",
        /// The provider payload could not be decoded.
        Decode { message: String } => "directions response decode failed: {message}",
    }
}

/// Port for resolving driving routes between two free-text locations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectionsSource: Send + Sync {
    /// Fetch every route alternative from `origin` to `destination`.
    async fn fetch_routes(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DirectionsResult, DirectionsSourceError>;
}
