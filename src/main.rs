use std::env;
use std::io;
use std::path::Path;

use geo::Coord;
use log::{error, info};
use structured_logger::json::new_writer;
use structured_logger::Builder;

use disaster_map::config::{load_user_config, UserConfig, DEFAULT_CONFIG_PATH};
use disaster_map::data::Category;
use disaster_map::errors::Result;
use disaster_map::etl::overpass::OverpassClient;
use disaster_map::render::headless::{HeadlessSurface, View};
use disaster_map::services::{wind_direction_text, Geocoder, WeatherClient};
use disaster_map::session::MapSession;

fn setup_logging() {
    Builder::with_level("info")
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

async fn describe_location(config: &UserConfig) {
    let geocoder = Geocoder::new(&config.geocoding_url, &config.mapbox_token);
    let location = geocoder.reverse(config.center_lon, config.center_lat).await;
    info!(street = location.street.as_str(), city = location.city.as_str(); "Search centre");

    let weather = WeatherClient::new(&config.weather_url);
    if let Some(current) = weather.current(config.center_lat, config.center_lon).await {
        info!(
            temperature = current.temperature,
            wind_speed = current.wind_speed,
            wind = wind_direction_text(current.wind_direction),
            humidity = current.humidity,
            pressure = current.pressure;
            "Weather at search centre"
        );
    }
}

async fn run(config: UserConfig) -> Result<()> {
    describe_location(&config).await;

    let view = View {
        center: Coord {
            x: config.center_lon,
            y: config.center_lat,
        },
        ..View::default()
    };
    let mut session = MapSession::new(&config);
    session.attach(HeadlessSurface::new(view));

    let source = OverpassClient::new(&config.overpass_url);
    session.start_round(&source).await?;

    for category in Category::all() {
        info!(
            category = category.to_string().as_str(),
            count = session.data().features(category).len();
            "Round features"
        );
    }

    if let Some(surface) = session.surface() {
        surface.export(Path::new(&config.dest_path))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    setup_logging();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = load_user_config(Path::new(&config_path))?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let result = runtime.block_on(run(config));
    if let Err(err) = &result {
        error!(err = err.message.as_str(); "Run failed");
    }
    result
}
