use std::future::Future;

use log::{debug, info};

use crate::{
    data::{CategoryKind, OverpassResponse, Shape, TypeConfig},
    errors::{Error, Result},
    geometry::BoundingBox,
};

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_TIMEOUT_S: u32 = 25;

/// Anything that can answer an Overpass QL query with raw elements.
pub trait ElementSource {
    fn fetch(&self, query: &str) -> impl Future<Output = Result<OverpassResponse>>;
}

fn tag_filter(config: &TypeConfig) -> String {
    match config.tag_values {
        Some(values) => {
            let pattern = values
                .iter()
                .map(|value| regex::escape(value))
                .collect::<Vec<_>>()
                .join("|");
            format!("[\"{}\"~\"{}\"]", config.tag_key, pattern)
        }
        None => format!("[\"{}\"]", config.tag_key),
    }
}

fn element_kinds(shape: Shape) -> &'static [&'static str] {
    match shape {
        Shape::Node => &["node", "way", "relation"],
        Shape::Line | Shape::Area => &["way", "relation"],
    }
}

/// One union query covering every enabled category of a shape.
pub fn build_query<K: CategoryKind>(bbox: &BoundingBox, kinds: &[K], timeout_s: u32) -> String {
    let area = bbox.to_overpass();
    let mut query = format!("[out:json][timeout:{}];(", timeout_s);
    for kind in kinds {
        let filter = tag_filter(kind.config());
        for element in element_kinds(K::SHAPE) {
            query.push_str(&format!("{}{}({});", element, filter, area));
        }
    }
    query.push_str(");out geom;");
    query
}

pub struct OverpassClient {
    client: reqwest::Client,
    url: String,
}

impl OverpassClient {
    pub fn new(url: &str) -> Self {
        OverpassClient {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }
}

impl ElementSource for OverpassClient {
    async fn fetch(&self, query: &str) -> Result<OverpassResponse> {
        debug!(url = self.url.as_str(), query_len = query.len(); "Posting Overpass query");
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::http(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: OverpassResponse = serde_json::from_str(&body)?;
        info!(url = self.url.as_str(), elements = parsed.elements.len(); "Overpass answered");
        Ok(parsed)
    }
}
