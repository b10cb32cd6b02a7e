use std::{fs::File, io::BufReader, path::Path};

use log::info;
use serde::Deserialize;

use crate::{
    errors::{Error, ErrorKind, Result},
    etl::overpass::{DEFAULT_OVERPASS_URL, DEFAULT_TIMEOUT_S},
    services::{geocoding::DEFAULT_GEOCODING_URL, weather::DEFAULT_WEATHER_URL},
};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.json";
pub const DEFAULT_MAP_STYLE: &str = "mapbox://styles/mapbox/streets-v12";

fn default_overpass_url() -> String {
    DEFAULT_OVERPASS_URL.to_string()
}

fn default_overpass_timeout_s() -> u32 {
    DEFAULT_TIMEOUT_S
}

fn default_center_lon() -> f64 {
    8.79053
}

fn default_center_lat() -> f64 {
    47.99143
}

fn default_radius_m() -> f64 {
    250.0
}

fn default_map_style() -> String {
    DEFAULT_MAP_STYLE.to_string()
}

fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

fn default_dest_path() -> String {
    "output".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_overpass_timeout_s")]
    pub overpass_timeout_s: u32,
    #[serde(default = "default_center_lon")]
    pub center_lon: f64,
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,
    /// Search radius around the centre, in metres.
    #[serde(default = "default_radius_m")]
    pub radius_m: f64,
    #[serde(default = "default_map_style")]
    pub map_style: String,
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    #[serde(default)]
    pub mapbox_token: String,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default = "default_dest_path")]
    pub dest_path: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            overpass_url: default_overpass_url(),
            overpass_timeout_s: default_overpass_timeout_s(),
            center_lon: default_center_lon(),
            center_lat: default_center_lat(),
            radius_m: default_radius_m(),
            map_style: default_map_style(),
            geocoding_url: default_geocoding_url(),
            mapbox_token: String::new(),
            weather_url: default_weather_url(),
            dest_path: default_dest_path(),
        }
    }
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path).map_err(|err| {
        Error::new(
            ErrorKind::Config,
            format!("Could not open config file {}: {}", path.display(), err),
        )
    })?;
    let config: UserConfig = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| Error::new(ErrorKind::Config, format!("Could not parse config: {}", err)))?;

    if config.radius_m <= 0.0 {
        return Err(Error::new(ErrorKind::Config, "radius_m must be positive"));
    }
    info!(path = path.to_string_lossy().as_ref(), radius_m = config.radius_m; "Loaded user config");
    Ok(config)
}
