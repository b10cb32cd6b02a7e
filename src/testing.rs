//! Fixtures shared by the unit tests.

use std::cell::RefCell;

use axum::{
    http::{header, StatusCode},
    Router,
};

use crate::{
    data::OverpassResponse,
    errors::{Error, Result},
    etl::overpass::ElementSource,
};

/// Serves `body` with `status` on every path and returns a base URL for it.
/// Must be called from inside a tokio runtime.
pub async fn serve(status: u16, body: &'static str) -> String {
    let status = StatusCode::from_u16(status).unwrap();
    let router = Router::new().fallback(move || async move {
        (status, [(header::CONTENT_TYPE, "application/json")], body)
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await.unwrap();
    });
    format!("http://{}/api/interpreter", addr)
}

/// Answers every query with the same canned body and records the queries.
pub struct CannedSource {
    pub body: String,
    pub fail_with: Option<u16>,
    pub queries: RefCell<Vec<String>>,
}

impl CannedSource {
    pub fn new(body: &str) -> Self {
        CannedSource {
            body: body.to_string(),
            fail_with: None,
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        CannedSource {
            fail_with: Some(status),
            ..CannedSource::new("{}")
        }
    }
}

impl ElementSource for CannedSource {
    async fn fetch(&self, query: &str) -> Result<OverpassResponse> {
        self.queries.borrow_mut().push(query.to_string());
        if let Some(status) = self.fail_with {
            return Err(Error::http(status));
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Railway 1, primary highway 2, tree 3, power pole 4 and a forest 5.
pub const SAMPLE: &str = r#"{"elements": [
    {"type": "way", "id": 1, "tags": {"railway": "rail"},
     "geometry": [{"lat": 48.0, "lon": 8.0}, {"lat": 48.0, "lon": 8.01}]},
    {"type": "way", "id": 2, "tags": {"highway": "primary", "name": "B14"},
     "geometry": [{"lat": 48.0, "lon": 8.0}, {"lat": 48.01, "lon": 8.0}]},
    {"type": "node", "id": 3, "lat": 48.001, "lon": 8.001, "tags": {"natural": "tree"}},
    {"type": "node", "id": 4, "lat": 48.002, "lon": 8.002, "tags": {"power": "pole"}},
    {"type": "way", "id": 5, "tags": {"landuse": "forest"},
     "geometry": [{"lat": 48.0, "lon": 8.0}, {"lat": 48.0, "lon": 8.01}, {"lat": 48.01, "lon": 8.01}]}
]}"#;
