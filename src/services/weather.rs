use log::{error, info};
use serde::Deserialize;

use crate::errors::{Error, Result};

pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str =
    "temperature_2m,wind_speed_10m,wind_direction_10m,relative_humidity_2m,surface_pressure";

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherData {
    pub temperature: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    relative_humidity_2m: f64,
    surface_pressure: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Current,
}

impl From<Current> for WeatherData {
    fn from(current: Current) -> Self {
        WeatherData {
            temperature: current.temperature_2m,
            wind_speed: current.wind_speed_10m,
            wind_direction: current.wind_direction_10m,
            humidity: current.relative_humidity_2m,
            pressure: current.surface_pressure,
        }
    }
}

/// Nearest of the 16 compass points, in 22.5° steps.
pub fn wind_direction_text(degrees: f64) -> &'static str {
    let index = (degrees / 22.5).round() as i64;
    COMPASS[index.rem_euclid(16) as usize]
}

/// Current conditions from Open-Meteo.
pub struct WeatherClient {
    client: reqwest::Client,
    url: String,
}

impl WeatherClient {
    pub fn new(url: &str) -> Self {
        WeatherClient {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    async fn forecast(&self, lat: f64, lng: f64) -> Result<ForecastResponse> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lng.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// `None` when the lookup fails for any reason.
    pub async fn current(&self, lat: f64, lng: f64) -> Option<WeatherData> {
        match self.forecast(lat, lng).await {
            Ok(forecast) => {
                let weather = WeatherData::from(forecast.current);
                info!(
                    temperature = weather.temperature,
                    wind_speed = weather.wind_speed,
                    wind_direction = wind_direction_text(weather.wind_direction);
                    "Fetched current weather"
                );
                Some(weather)
            }
            Err(err) => {
                error!(err = err.message.as_str(); "Failed to fetch weather data");
                None
            }
        }
    }
}
