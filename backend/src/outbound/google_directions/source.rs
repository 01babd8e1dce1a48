//! Google Directions source adapter.
//!
//! One GET per query, sent through the retrying executor. The adapter maps
//! provider statuses onto [`DirectionsSourceError`] and decodes the payload
//! into domain routes.

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::dto::DirectionsResponseDto;
use crate::domain::RetryingRequestExecutor;
use crate::domain::ports::{
    DirectionsResult, DirectionsSource, DirectionsSourceError, HttpMethod, OutboundResponse,
    RequestOptions,
};

/// Public Google Directions JSON endpoint.
pub const GOOGLE_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Directions source backed by the Google Directions API.
pub struct GoogleDirectionsSource {
    executor: RetryingRequestExecutor,
    endpoint: Url,
    api_key: String,
}

impl GoogleDirectionsSource {
    /// Build a source against the public endpoint.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the error type is shared with
    /// [`GoogleDirectionsSource::with_endpoint`].
    pub fn new(
        executor: RetryingRequestExecutor,
        api_key: impl Into<String>,
    ) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(GOOGLE_DIRECTIONS_URL)?;
        Ok(Self::with_endpoint(executor, endpoint, api_key))
    }

    /// Build a source against an explicit endpoint.
    pub fn with_endpoint(
        executor: RetryingRequestExecutor,
        endpoint: Url,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            endpoint,
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl DirectionsSource for GoogleDirectionsSource {
    async fn fetch_routes(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DirectionsResult, DirectionsSourceError> {
        let options = RequestOptions::default()
            .with_query("origin", origin)
            .with_query("destination", destination)
            .with_query("mode", "driving")
            .with_query("alternatives", "true")
            .with_query("key", self.api_key.as_str());

        let response = self
            .executor
            .execute(HttpMethod::Get, self.endpoint.clone(), options)
            .await
            .map_err(|error| DirectionsSourceError::upstream(error.to_string()))?;

        let result = parse_directions(&response)?;
        debug!(
            routes = result.routes.len(),
            origin = %result.origin_address,
            destination = %result.destination_address,
            "directions resolved"
        );
        Ok(result)
    }
}

fn parse_directions(response: &OutboundResponse) -> Result<DirectionsResult, DirectionsSourceError> {
    if !response.is_success() {
        return Err(DirectionsSourceError::upstream(format!(
            "status {}: {}",
            response.status,
            response.body_preview()
        )));
    }

    let decoded: DirectionsResponseDto = response
        .json()
        .map_err(|error| DirectionsSourceError::decode(error.to_string()))?;
    if decoded.status != "OK" {
        return Err(DirectionsSourceError::rejected(decoded.status));
    }
    if decoded.routes.is_empty() {
        return Err(DirectionsSourceError::no_routes());
    }
    decoded.into_domain().map_err(DirectionsSourceError::decode)
}
