//! Route and weather payloads returned to clients and stored in the cache.
//!
//! Field names are the public JSON contract; every type round-trips through
//! serde so the durable cache can hold whole responses.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl LatLng {
    /// Build a coordinate pair.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Forecast conditions for one hour at one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub temperature_c: f64,
    pub apparent_temperature_c: f64,
    pub precipitation_mm: f64,
    pub precipitation_probability: i64,
    /// WMO weather interpretation code.
    pub weather_code: i64,
    pub weather_description: String,
    pub wind_speed_kmh: f64,
    pub humidity_percent: i64,
}

/// A sampled point along a route with its expected arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub location: LatLng,
    pub minutes_from_start: i64,
    /// Expected arrival, in the departure time's offset.
    pub estimated_time: DateTime<FixedOffset>,
    /// `None` when the forecast for this point could not be fetched.
    #[serde(default)]
    pub weather: Option<WeatherData>,
}

/// One route alternative annotated with weather along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteWithWeather {
    pub route_index: usize,
    pub overview_polyline: String,
    pub summary: String,
    pub total_duration_minutes: i64,
    pub total_distance_km: f64,
    pub waypoints: Vec<Waypoint>,
}

/// Reserved recommendation slot; always `None` in responses.
#[doc(hidden)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRecommendation {
    pub recommended_route_index: usize,
}

/// Every route alternative between two places, with weather.
///
/// # Examples
/// ```
/// use route_weather::domain::MultiRouteResponse;
///
/// let json = r#"{"origin_address":"A","destination_address":"B","routes":[]}"#;
/// let response: MultiRouteResponse = serde_json::from_str(json).expect("valid payload");
/// assert!(response.recommendation.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRouteResponse {
    pub origin_address: String,
    pub destination_address: String,
    pub routes: Vec<RouteWithWeather>,
    #[serde(default)]
    pub recommendation: Option<RouteRecommendation>,
}

#[cfg(test)]
mod tests {
    //! Wire shape of the response model.
    use super::*;
    use serde_json::json;

    #[test]
    fn recommendation_slot_is_null_and_tolerates_richer_payloads() {
        let response = MultiRouteResponse {
            origin_address: "A".to_owned(),
            destination_address: "B".to_owned(),
            routes: Vec::new(),
            recommendation: None,
        };
        let value = serde_json::to_value(&response).expect("serialise response");
        assert_eq!(value["recommendation"], serde_json::Value::Null);

        let richer = json!({
            "origin_address": "A",
            "destination_address": "B",
            "routes": [],
            "recommendation": {"recommended_route_index": 1, "scores": [], "advisories": []}
        });
        let decoded: MultiRouteResponse = serde_json::from_value(richer).expect("decodes");
        assert_eq!(
            decoded.recommendation,
            Some(RouteRecommendation {
                recommended_route_index: 1
            })
        );
    }

    #[test]
    fn waypoint_keeps_departure_offset() {
        let value = json!({
            "location": {"lat": 51.5, "lng": -0.12},
            "minutes_from_start": 30,
            "estimated_time": "2026-03-01T09:30:00+01:00"
        });
        let waypoint: Waypoint = serde_json::from_value(value).expect("parse waypoint");
        assert_eq!(waypoint.weather, None);
        assert_eq!(waypoint.estimated_time.offset().local_minus_utc(), 3600);
        assert_eq!(
            waypoint.estimated_time.to_rfc3339(),
            "2026-03-01T09:30:00+01:00"
        );
    }
}
