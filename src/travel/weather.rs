//! Weather lookups. All figures are random dummy data; a real implementation
//! would call a weather API here.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{FunctionSchema, indexed};

const WIND_DIRECTIONS: [&str; 4] = ["N", "S", "E", "W"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FunctionSchema)]
pub struct WeatherData {
    pub location: String,
    /// `YYYY-MM-DD`, or "current".
    pub date: String,
    /// Degrees Celsius.
    pub temperature: i32,
    /// Percent.
    pub humidity: u32,
    /// Millimetres; zero most of the time.
    pub rainfall: u32,
    /// km/h.
    pub wind_speed: u32,
    pub wind_direction: String,
    /// hPa.
    pub pressure: u32,
    #[serde(rename = "UV_index")]
    pub uv_index: u32,
}

fn generate(rng: &mut impl Rng, location: String, date: Option<String>) -> WeatherData {
    WeatherData {
        location,
        date: date.unwrap_or_else(|| "current".to_string()),
        temperature: rng.gen_range(-30..=50),
        humidity: rng.gen_range(0..=100),
        rainfall: if rng.gen_bool(0.3) {
            rng.gen_range(0..=50)
        } else {
            0
        },
        wind_speed: rng.gen_range(0..=20),
        wind_direction: WIND_DIRECTIONS
            .choose(rng)
            .copied()
            .unwrap_or("N")
            .to_string(),
        pressure: rng.gen_range(950..=1050),
        uv_index: rng.gen_range(0..=11),
    }
}

fn series(location: &str, days: u32) -> Vec<WeatherData> {
    let mut rng = rand::thread_rng();
    (0..days)
        .map(|_| generate(&mut rng, location.to_string(), None))
        .collect()
}

fn feels_like(data: &WeatherData) -> f64 {
    f64::from(data.temperature) + 0.05 * f64::from(data.humidity)
        - 0.04 * f64::from(data.wind_speed)
}

#[indexed]
/// Fetch weather data for the specified location and date. Dates are
/// YYYY-MM-DD; without a date the current weather is returned.
pub fn fetch_weather_data(location: String, date: Option<String>) -> WeatherData {
    generate(&mut rand::thread_rng(), location, date)
}

#[indexed]
/// Fetch current weather data for the specified location.
pub fn current_weather(location: String) -> WeatherData {
    fetch_weather_data(location, None)
}

#[indexed]
/// Fetch weather forecast data for the specified location for a number of days.
pub fn forecast_weather(location: String, days: u32) -> Vec<WeatherData> {
    series(&location, days)
}

#[indexed]
/// Fetch historical weather data for the specified location and date (YYYY-MM-DD).
pub fn historical_weather(location: String, date: String) -> WeatherData {
    fetch_weather_data(location, Some(date))
}

#[indexed]
/// Calculate the average temperature for the specified location over a number
/// of past days (default 30).
pub fn average_temperature(location: String, days: Option<u32>) -> f64 {
    let days = days.unwrap_or(30);
    if days == 0 {
        return 0.0;
    }
    let total: i64 = series(&location, days)
        .iter()
        .map(|d| i64::from(d.temperature))
        .sum();
    total as f64 / f64::from(days)
}

#[indexed]
/// Calculate the maximum and minimum temperature for the specified location
/// over a number of past days (default 30).
pub fn max_min_temperature(location: String, days: Option<u32>) -> Option<(i32, i32)> {
    let data = series(&location, days.unwrap_or(30));
    let max = data.iter().map(|d| d.temperature).max()?;
    let min = data.iter().map(|d| d.temperature).min()?;
    Some((max, min))
}

#[indexed]
/// Calculate the chance of rain, as a percentage, for the specified location
/// over the next number of hours (default 24).
pub fn rain_chance(location: String, hours: Option<u32>) -> f64 {
    // daily granularity only
    let days = hours.unwrap_or(24) / 24;
    if days == 0 {
        return 0.0;
    }
    let rainy = series(&location, days)
        .iter()
        .filter(|d| d.rainfall > 0)
        .count();
    rainy as f64 / f64::from(days) * 100.0
}

#[indexed]
/// Fetch the UV index for the specified location.
pub fn uv_index(location: String) -> u32 {
    fetch_weather_data(location, None).uv_index
}

#[indexed]
/// Fetch the current humidity for the specified location.
pub fn humidity(location: String) -> u32 {
    fetch_weather_data(location, None).humidity
}

#[indexed]
/// Fetch the current wind speed for the specified location.
pub fn wind_speed(location: String) -> u32 {
    fetch_weather_data(location, None).wind_speed
}

#[indexed]
/// Calculate the "feels like" temperature for the specified location.
pub fn feels_like_temperature(location: String) -> f64 {
    feels_like(&fetch_weather_data(location, None))
}
