//! Best-effort lookups shown next to the map. Failures never abort a round.

pub mod geocoding;
pub mod weather;

pub use self::geocoding::{Geocoder, LocationInfo};
pub use self::weather::{wind_direction_text, WeatherClient, WeatherData};
