//! Driven port for hourly point forecasts.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use super::define_port_error;
use crate::domain::{LatLng, WeatherData};

define_port_error! {
    /// Errors surfaced while fetching a forecast.
    pub enum WeatherSourceError {
        /// The provider could not be reached or answered with a failure status.
        Upstream { message: String } => "weather upstream failed: {message}",
        /// The provider payload could not be decoded.
        Decode { message: String } => "weather response decode failed: {message}",
    }
}

/// Port for fetching the forecast hour closest to a point in time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the forecast for `location` at the hour containing `at`.
    async fn fetch_weather(
        &self,
        location: LatLng,
        at: DateTime<FixedOffset>,
    ) -> Result<WeatherData, WeatherSourceError>;
}
