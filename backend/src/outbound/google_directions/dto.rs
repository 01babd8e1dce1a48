//! DTOs for decoding Google Directions JSON responses.
//!
//! Only the fields the service reads are declared; everything else in the
//! payload is ignored.

use serde::Deserialize;

use crate::domain::LatLng;
use crate::domain::ports::{DirectionsResult, DirectionsRoute, RouteStep};

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsResponseDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) routes: Vec<RouteDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RouteDto {
    overview_polyline: PolylineDto,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<LegDto>,
}

#[derive(Debug, Deserialize)]
struct LegDto {
    start_address: String,
    end_address: String,
    #[serde(default)]
    steps: Vec<StepDto>,
}

#[derive(Debug, Deserialize)]
struct StepDto {
    duration: ValueDto,
    distance: ValueDto,
    start_location: LatLngDto,
    end_location: LatLngDto,
    polyline: PolylineDto,
}

#[derive(Debug, Deserialize)]
struct ValueDto {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct PolylineDto {
    points: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLngDto {
    lat: f64,
    lng: f64,
}

impl From<LatLngDto> for LatLng {
    fn from(value: LatLngDto) -> Self {
        Self::new(value.lat, value.lng)
    }
}

impl DirectionsResponseDto {
    /// Flatten every route's legs into one step list.
    ///
    /// Addresses come from the first route: the start of its first leg and
    /// the end of its last leg. Callers check `status` and emptiness first.
    pub(super) fn into_domain(self) -> Result<DirectionsResult, String> {
        let first = self.routes.first().ok_or("response contains no routes")?;
        let origin_address = first
            .legs
            .first()
            .map(|leg| leg.start_address.clone())
            .ok_or("first route has no legs")?;
        let destination_address = first
            .legs
            .last()
            .map(|leg| leg.end_address.clone())
            .ok_or("first route has no legs")?;

        let routes = self.routes.into_iter().map(RouteDto::into_domain).collect();
        Ok(DirectionsResult {
            origin_address,
            destination_address,
            routes,
        })
    }
}

impl RouteDto {
    fn into_domain(self) -> DirectionsRoute {
        let steps = self
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(|step| RouteStep {
                duration_seconds: step.duration.value,
                distance_meters: step.distance.value,
                start_location: step.start_location.into(),
                end_location: step.end_location.into(),
                polyline: step.polyline.points,
            })
            .collect::<Vec<_>>();

        DirectionsRoute {
            overview_polyline: self.overview_polyline.points,
            summary: self.summary,
            total_duration_seconds: steps.iter().map(|step| step.duration_seconds).sum(),
            total_distance_meters: steps.iter().map(|step| step.distance_meters).sum(),
            steps,
        }
    }
}
