//! Open-Meteo weather source adapter.
//!
//! Each lookup requests one day of hourly data for a single point and reads
//! the row for the target hour. A semaphore bounds how many lookups are in
//! flight at once so a wide route does not flood the provider.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Timelike};
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;

use super::dto::{ForecastDto, HOURLY_PARAMS};
use crate::domain::ports::{
    HttpMethod, OutboundResponse, RequestOptions, WeatherSource, WeatherSourceError,
};
use crate::domain::{LatLng, RetryingRequestExecutor, WeatherData};

/// Public Open-Meteo forecast endpoint.
pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Upper bound on concurrent forecast requests per source.
pub const MAX_CONCURRENT_REQUESTS: usize = 5;

/// Weather source backed by the Open-Meteo forecast API.
pub struct OpenMeteoWeatherSource {
    executor: RetryingRequestExecutor,
    endpoint: Url,
    permits: Semaphore,
}

impl OpenMeteoWeatherSource {
    /// Build a source against the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in endpoint fails to parse.
    pub fn new(executor: RetryingRequestExecutor) -> Result<Self, url::ParseError> {
        Ok(Self::with_endpoint(executor, Url::parse(OPEN_METEO_URL)?))
    }

    /// Build a source against an explicit endpoint.
    pub fn with_endpoint(executor: RetryingRequestExecutor, endpoint: Url) -> Self {
        Self {
            executor,
            endpoint,
            permits: Semaphore::new(MAX_CONCURRENT_REQUESTS),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoWeatherSource {
    async fn fetch_weather(
        &self,
        location: LatLng,
        at: DateTime<FixedOffset>,
    ) -> Result<WeatherData, WeatherSourceError> {
        let date = at.format("%Y-%m-%d").to_string();
        let options = RequestOptions::default()
            .with_query("latitude", round_coordinate(location.lat))
            .with_query("longitude", round_coordinate(location.lng))
            .with_query("hourly", HOURLY_PARAMS.join(","))
            .with_query("start_date", &date)
            .with_query("end_date", &date)
            .with_query("timezone", "auto");

        let response = {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|error| WeatherSourceError::upstream(error.to_string()))?;
            self.executor
                .execute(HttpMethod::Get, self.endpoint.clone(), options)
                .await
                .map_err(|error| WeatherSourceError::upstream(error.to_string()))?
        };

        let weather = parse_forecast(&response, at.hour()).map_err(|error| match error {
            WeatherSourceError::Decode { message } => WeatherSourceError::decode(format!(
                "({}, {}) on {date}: {message}",
                location.lat, location.lng
            )),
            other => other,
        })?;
        debug!(
            lat = location.lat,
            lng = location.lng,
            code = weather.weather_code,
            "forecast resolved"
        );
        Ok(weather)
    }
}

fn parse_forecast(response: &OutboundResponse, hour: u32) -> Result<WeatherData, WeatherSourceError> {
    if !response.is_success() {
        return Err(WeatherSourceError::upstream(format!(
            "status {}: {}",
            response.status,
            response.body_preview()
        )));
    }
    let decoded: ForecastDto = response
        .json()
        .map_err(|error| WeatherSourceError::decode(error.to_string()))?;
    let hourly = decoded.hourly.ok_or_else(|| {
        WeatherSourceError::decode(format!(
            "response has no hourly block: {}",
            response.body_preview()
        ))
    })?;
    hourly.row_for_hour(hour).map_err(WeatherSourceError::decode)
}

fn round_coordinate(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
