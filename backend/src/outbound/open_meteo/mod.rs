//! Open-Meteo hourly forecast adapter.

mod dto;
mod source;
mod wmo;

pub use source::{MAX_CONCURRENT_REQUESTS, OPEN_METEO_URL, OpenMeteoWeatherSource};
pub use wmo::describe_weather_code;
