use std::{collections::BTreeMap, fmt};

use geo::Coord;
use serde::Deserialize;

pub type OsmId = i64;

pub type Tags = BTreeMap<String, String>;

/// Body of an Overpass `[out:json]` answer. Only the parts we read are kept.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct OverpassResponse {
    #[serde(default)]
    pub version: Option<f64>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub elements: Vec<RawElement>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Node,
    Way,
    Relation,
    #[serde(other)]
    Other,
}

/// OSM numbers nodes, ways and relations independently, so an id alone
/// does not name an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub element_type: ElementType,
    pub id: OsmId,
}

impl ElementRef {
    pub fn node(id: OsmId) -> Self {
        ElementRef {
            element_type: ElementType::Node,
            id,
        }
    }

    pub fn way(id: OsmId) -> Self {
        ElementRef {
            element_type: ElementType::Way,
            id,
        }
    }

    pub fn relation(id: OsmId) -> Self {
        ElementRef {
            element_type: ElementType::Relation,
            id,
        }
    }
}

/// `n7`, `w7`, `r7`.
impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.element_type {
            ElementType::Node => "n",
            ElementType::Way => "w",
            ElementType::Relation => "r",
            ElementType::Other => "x",
        };
        write!(f, "{}{}", prefix, self.id)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeomPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<&GeomPoint> for Coord {
    fn from(value: &GeomPoint) -> Self {
        Coord {
            x: value.lon,
            y: value.lat,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawMember {
    #[serde(rename = "type")]
    pub member_type: ElementType,
    #[serde(rename = "ref")]
    pub member_ref: OsmId,
    #[serde(default)]
    pub role: String,
    // `out geom` leaves null holes for nodes outside the box
    #[serde(default)]
    pub geometry: Vec<Option<GeomPoint>>,
}

impl RawMember {
    pub fn coords(&self) -> Vec<Coord> {
        self.geometry.iter().flatten().map(Coord::from).collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawElement {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub id: OsmId,
    #[serde(default)]
    pub tags: Option<Tags>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub geometry: Vec<Option<GeomPoint>>,
    #[serde(default)]
    pub members: Vec<RawMember>,
}

impl RawElement {
    /// Geometry vertices in `[lon, lat]` order, skipping null holes.
    pub fn coords(&self) -> Vec<Coord> {
        self.geometry.iter().flatten().map(Coord::from).collect()
    }

    pub fn position(&self) -> Option<Coord> {
        Some(Coord {
            x: self.lon?,
            y: self.lat?,
        })
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef {
            element_type: self.element_type,
            id: self.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_out_geom_payload() {
        let body = r#"{
            "version": 0.6,
            "generator": "Overpass API",
            "elements": [
                {"type": "node", "id": 1, "lat": 48.0, "lon": 8.0, "tags": {"natural": "tree"}},
                {"type": "way", "id": 2, "nodes": [1, 3], "tags": {"railway": "rail"},
                 "geometry": [{"lat": 48.0, "lon": 8.0}, null, {"lat": 48.1, "lon": 8.1}]},
                {"type": "relation", "id": 3, "tags": {"type": "multipolygon"},
                 "members": [{"type": "way", "ref": 2, "role": "outer", "geometry": [{"lat": 1.0, "lon": 2.0}]}]},
                {"type": "area", "id": 4}
            ]
        }"#;
        let response: OverpassResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.elements.len(), 4);

        let node = &response.elements[0];
        assert_eq!(node.element_type, ElementType::Node);
        assert_eq!(node.position(), Some(Coord { x: 8.0, y: 48.0 }));
        assert_eq!(node.tag("natural"), Some("tree"));

        let way = &response.elements[1];
        assert_eq!(way.coords(), vec![Coord { x: 8.0, y: 48.0 }, Coord { x: 8.1, y: 48.1 }]);

        let relation = &response.elements[2];
        assert_eq!(relation.members[0].role, "outer");
        assert_eq!(relation.members[0].coords(), vec![Coord { x: 2.0, y: 1.0 }]);

        assert_eq!(response.elements[3].element_type, ElementType::Other);
        assert_eq!(node.element_ref().to_string(), "n1");
        assert_eq!(way.element_ref().to_string(), "w2");
        assert_ne!(node.element_ref(), ElementRef::way(1));
        assert!(response.elements[3].tags.is_none());
    }
}
