//! DTOs for decoding Open-Meteo forecast responses.

use serde::Deserialize;

use super::wmo::describe_weather_code;
use crate::domain::WeatherData;

/// Hourly variables requested from the forecast endpoint, in request order.
pub(super) const HOURLY_PARAMS: [&str; 7] = [
    "temperature_2m",
    "apparent_temperature",
    "precipitation",
    "precipitation_probability",
    "weather_code",
    "wind_speed_10m",
    "relative_humidity_2m",
];

#[derive(Debug, Deserialize)]
pub(super) struct ForecastDto {
    pub(super) hourly: Option<HourlyDto>,
}

/// Column-oriented hourly series. Open-Meteo emits `null` for hours it has
/// no value for.
#[derive(Debug, Default, Deserialize)]
pub(super) struct HourlyDto {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
}

impl HourlyDto {
    /// Read the row for `hour`, clamped to the last available row.
    pub(super) fn row_for_hour(&self, hour: u32) -> Result<WeatherData, String> {
        let last = self
            .time
            .len()
            .checked_sub(1)
            .ok_or("hourly series is empty")?;
        let index = usize::try_from(hour).map_or(last, |hour| hour.min(last));

        let weather_code = as_integer(value_at(&self.weather_code, "weather_code", index)?);
        Ok(WeatherData {
            temperature_c: value_at(&self.temperature_2m, "temperature_2m", index)?,
            apparent_temperature_c: value_at(
                &self.apparent_temperature,
                "apparent_temperature",
                index,
            )?,
            precipitation_mm: value_at(&self.precipitation, "precipitation", index)?,
            precipitation_probability: as_integer(value_at(
                &self.precipitation_probability,
                "precipitation_probability",
                index,
            )?),
            weather_code,
            weather_description: describe_weather_code(weather_code).to_owned(),
            wind_speed_kmh: value_at(&self.wind_speed_10m, "wind_speed_10m", index)?,
            humidity_percent: as_integer(value_at(
                &self.relative_humidity_2m,
                "relative_humidity_2m",
                index,
            )?),
        })
    }
}

fn value_at(series: &[Option<f64>], name: &str, index: usize) -> Result<f64, String> {
    series
        .get(index)
        .copied()
        .flatten()
        .ok_or_else(|| format!("hourly {name} has no value at index {index}"))
}

// Codes and percentages arrive as small whole numbers.
fn as_integer(value: f64) -> i64 {
    value.round() as i64
}
