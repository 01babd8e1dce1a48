//! Route planning handler.
//!
//! ```text
//! POST /api/routes  Plan every route alternative with waypoint forecasts
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, post, web};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, RouteQuery};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::PRIVATE_NO_CACHE;
use crate::inbound::http::state::HttpState;

/// Longest accepted origin or destination, in characters.
pub const MAX_PLACE_LENGTH: usize = 500;

/// Route planning request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteRequest {
    /// Free-text origin.
    pub origin: String,
    /// Free-text destination.
    pub destination: String,
    /// RFC 3339 departure time carrying a UTC offset. Absent means now.
    #[serde(default)]
    pub departure_time: Option<String>,
}

impl RouteRequest {
    /// Validate the body and turn it into a domain query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::invalid_request`] with the offending field in the
    /// details when a place is blank or too long, or the departure time is
    /// not an offset-qualified RFC 3339 timestamp.
    pub fn into_query(self) -> Result<RouteQuery, Error> {
        let origin = validate_place("origin", &self.origin)?;
        let destination = validate_place("destination", &self.destination)?;
        let departure_time = self
            .departure_time
            .as_deref()
            .map(parse_departure)
            .transpose()?;
        Ok(RouteQuery {
            origin,
            destination,
            departure_time,
        })
    }
}

fn validate_place(field: &'static str, raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(
            Error::invalid_request(format!("{field} must not be empty"))
                .with_details(json!({ "field": field, "code": "missing_field" })),
        );
    }
    if raw.chars().count() > MAX_PLACE_LENGTH {
        return Err(Error::invalid_request(format!(
            "{field} must be at most {MAX_PLACE_LENGTH} characters"
        ))
        .with_details(json!({ "field": field, "code": "too_long" })));
    }
    Ok(trimmed.to_owned())
}

fn parse_departure(raw: &str) -> Result<DateTime<FixedOffset>, Error> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|err| {
        Error::invalid_request("departure_time must be an RFC 3339 timestamp with a UTC offset")
            .with_details(json!({
                "field": "departure_time",
                "value": raw,
                "code": "invalid_timestamp",
                "reason": err.to_string(),
            }))
    })
}

/// Plan routes between two places and attach forecasts along each one.
#[post("/api/routes")]
pub async fn plan_routes(
    state: web::Data<HttpState>,
    payload: web::Json<RouteRequest>,
) -> ApiResult<HttpResponse> {
    let query = payload.into_inner().into_query()?;
    let response = state.routes.plan(&query).await?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, PRIVATE_NO_CACHE))
        .json(response))
}
