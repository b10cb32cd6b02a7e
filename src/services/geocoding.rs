use log::{error, info};
use serde::Deserialize;

use crate::errors::{Error, Result};

pub const DEFAULT_GEOCODING_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";

const UNKNOWN: &str = "Unknown";
const FAILED: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    pub street: String,
    pub city: String,
}

impl LocationInfo {
    fn filled(value: &str) -> Self {
        LocationInfo {
            street: value.to_string(),
            city: value.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PlaceFeature {
    #[serde(default)]
    place_type: Vec<String>,
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<PlaceFeature>,
}

fn has_type(feature: &PlaceFeature, place_type: &str) -> bool {
    feature.place_type.iter().any(|t| t == place_type)
}

fn non_empty(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Street from the first address or POI, city from the first place.
fn location_from(response: &PlacesResponse) -> LocationInfo {
    let street = response
        .features
        .iter()
        .find(|feature| has_type(feature, "address") || has_type(feature, "poi"))
        .and_then(|feature| feature.place_name.split(',').next());
    let city = response
        .features
        .iter()
        .find(|feature| has_type(feature, "place"))
        .map(|feature| feature.text.as_str());

    LocationInfo {
        street: non_empty(street),
        city: non_empty(city),
    }
}

/// Mapbox reverse geocoding.
pub struct Geocoder {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl Geocoder {
    pub fn new(url: &str, token: &str) -> Self {
        Geocoder {
            client: reqwest::Client::new(),
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    async fn lookup(&self, lng: f64, lat: f64) -> Result<PlacesResponse> {
        let response = self
            .client
            .get(format!("{}/{},{}.json", self.url, lng, lat))
            .query(&[("access_token", self.token.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Never fails: a missing part reads "Unknown", a failed lookup "Error".
    pub async fn reverse(&self, lng: f64, lat: f64) -> LocationInfo {
        match self.lookup(lng, lat).await {
            Ok(response) => {
                let location = location_from(&response);
                info!(
                    street = location.street.as_str(),
                    city = location.city.as_str();
                    "Reverse geocoded centre"
                );
                location
            }
            Err(err) => {
                error!(err = err.message.as_str(); "Reverse geocoding error");
                LocationInfo::filled(FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve;

    fn parse(body: &str) -> PlacesResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn street_and_city_come_from_different_features() {
        let response = parse(
            r#"{"features": [
                {"place_type": ["poi"], "place_name": "Bahnhof Tuttlingen, Bahnhofstraße, Tuttlingen", "text": "Bahnhof"},
                {"place_type": ["place"], "place_name": "Tuttlingen, Baden-Württemberg", "text": "Tuttlingen"}
            ]}"#,
        );
        let location = location_from(&response);
        assert_eq!(location.street, "Bahnhof Tuttlingen");
        assert_eq!(location.city, "Tuttlingen");
    }

    #[test]
    fn missing_parts_are_unknown() {
        let region = r#"{"features": [{"place_type": ["region"], "place_name": "x", "text": "x"}]}"#;
        let location = location_from(&parse(region));
        assert_eq!(location, LocationInfo::filled("Unknown"));
        assert_eq!(location_from(&parse("{}")), LocationInfo::filled("Unknown"));
    }

    #[tokio::test]
    async fn failures_read_error() {
        let url = serve(401, "{}").await;
        let location = Geocoder::new(&url, "token").reverse(8.79, 47.99).await;
        assert_eq!(location, LocationInfo::filled("Error"));
    }
}
