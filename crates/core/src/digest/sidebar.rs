//! Sidebar lookups: weather, sun times and who is in space.
//!
//! Every lookup is best-effort. [`fetch_sidebar`] logs failures and leaves
//! the corresponding panel out rather than failing the edition.

use chrono::{DateTime, FixedOffset};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::config::{DigestConfig, Location};
use crate::fetch::FetchConfig;
use crate::{BroadsheetError, Result};

/// Current conditions at the configured location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub temperature_c: f64,
    pub wind_kmh: f64,
    pub description: String,
}

/// Local sunrise and sunset, formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SunTimes {
    /// `HH:MM` in the location's offset.
    pub sunrise: String,
    pub sunset: String,
    /// Like `16h 38m`.
    pub day_length: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Astronaut {
    pub name: String,
    pub craft: String,
}

/// Optional panels next to the headlines.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sidebar {
    pub weather: Option<Weather>,
    pub sun: Option<SunTimes>,
    pub astronauts: Option<Vec<Astronaut>>,
}

impl Sidebar {
    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.sun.is_none() && self.astronauts.is_none()
    }
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: i64,
}

#[derive(Deserialize)]
struct SunResponse {
    results: SunResults,
    status: String,
}

#[derive(Deserialize)]
struct SunResults {
    sunrise: String,
    sunset: String,
    day_length: u64,
}

#[derive(Deserialize)]
struct AstrosResponse {
    message: String,
    people: Vec<Astronaut>,
}

/// Looks up current weather from an Open-Meteo compatible endpoint.
pub async fn fetch_weather(endpoint: &str, location: &Location, fetch: &FetchConfig) -> Result<Weather> {
    let query = [
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
        ("current_weather", "true".to_string()),
    ];
    let response: ForecastResponse = get_json(endpoint, &query, fetch).await?;
    let current = response.current_weather;

    Ok(Weather {
        temperature_c: current.temperature,
        wind_kmh: current.windspeed,
        description: describe_weather_code(current.weathercode).to_string(),
    })
}

/// Looks up today's sunrise and sunset from a sunrise-sunset.org compatible endpoint.
pub async fn fetch_sun_times(endpoint: &str, location: &Location, fetch: &FetchConfig) -> Result<SunTimes> {
    let query = [
        ("lat", location.latitude.to_string()),
        ("lng", location.longitude.to_string()),
        ("formatted", "0".to_string()),
    ];
    let response: SunResponse = get_json(endpoint, &query, fetch).await?;

    if response.status != "OK" {
        return Err(BroadsheetError::FeedError(format!("sun times lookup returned {}", response.status)));
    }

    let offset = location.utc_offset()?;
    Ok(SunTimes {
        sunrise: local_clock(&response.results.sunrise, offset)?,
        sunset: local_clock(&response.results.sunset, offset)?,
        day_length: format_duration(response.results.day_length),
    })
}

/// Lists the people currently in space from an Open Notify compatible endpoint.
pub async fn fetch_astronauts(endpoint: &str, fetch: &FetchConfig) -> Result<Vec<Astronaut>> {
    let response: AstrosResponse = get_json(endpoint, &[], fetch).await?;

    if response.message != "success" {
        return Err(BroadsheetError::FeedError(format!("astronaut lookup returned {}", response.message)));
    }

    Ok(response.people)
}

/// Runs all three lookups concurrently, dropping the ones that fail.
pub async fn fetch_sidebar(config: &DigestConfig, fetch: &FetchConfig) -> Sidebar {
    let (weather, sun, astronauts) = tokio::join!(
        fetch_weather(&config.endpoints.weather, &config.location, fetch),
        fetch_sun_times(&config.endpoints.sun, &config.location, fetch),
        fetch_astronauts(&config.endpoints.astronauts, fetch),
    );

    Sidebar {
        weather: weather.inspect_err(|e| warn!(error = %e, "weather lookup failed")).ok(),
        sun: sun.inspect_err(|e| warn!(error = %e, "sun times lookup failed")).ok(),
        astronauts: astronauts.inspect_err(|e| warn!(error = %e, "astronaut lookup failed")).ok(),
    }
}

/// Text for a WMO weather interpretation code.
pub fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown conditions",
    }
}

async fn get_json<T: DeserializeOwned>(endpoint: &str, query: &[(&str, String)], fetch: &FetchConfig) -> Result<T> {
    let url = Url::parse(endpoint).map_err(|e| BroadsheetError::InvalidUrl(e.to_string()))?;
    debug!(url = %url, "sidebar lookup");

    let response = fetch.client()?.get(url).query(query).send().await.map_err(|e| fetch.map_send_error(e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(BroadsheetError::HttpStatus { status: status.as_u16(), url: endpoint.to_string() });
    }

    response.json::<T>().await.map_err(|e| fetch.map_send_error(e))
}

fn local_clock(timestamp: &str, offset: FixedOffset) -> Result<String> {
    let parsed = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| BroadsheetError::FeedError(format!("bad timestamp {timestamp}: {e}")))?;
    Ok(parsed.with_timezone(&offset).format("%H:%M").to_string())
}

fn format_duration(secs: u64) -> String {
    format!("{}h {:02}m", secs / 3600, (secs % 3600) / 60)
}
