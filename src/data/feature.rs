use geo::Coord;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;

use super::osm::{ElementRef, ElementType, OsmId, Tags};

pub type Ring = Vec<Coord>;

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    LineString(Vec<Coord>),
    Point(Coord),
    /// Outer ring first, holes after. Rings are closed.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

fn position(coord: &Coord) -> Vec<f64> {
    vec![coord.x, coord.y]
}

fn line(coords: &[Coord]) -> Vec<Vec<f64>> {
    coords.iter().map(position).collect()
}

fn rings(polygon: &[Ring]) -> Vec<Vec<Vec<f64>>> {
    polygon.iter().map(|ring| line(ring)).collect()
}

impl FeatureGeometry {
    pub fn to_geojson(&self) -> Geometry {
        let value = match self {
            FeatureGeometry::LineString(coords) => Value::LineString(line(coords)),
            FeatureGeometry::Point(coord) => Value::Point(position(coord)),
            FeatureGeometry::Polygon(polygon) => Value::Polygon(rings(polygon)),
            FeatureGeometry::MultiPolygon(polygons) => {
                Value::MultiPolygon(polygons.iter().map(|polygon| rings(polygon)).collect())
            }
        };
        Geometry::new(value)
    }
}

/// One classified OSM element: raw tags plus `id`, and normalised geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericFeature {
    pub id: OsmId,
    pub element_type: ElementType,
    pub properties: JsonObject,
    pub geometry: FeatureGeometry,
}

impl GenericFeature {
    pub fn new(element: ElementRef, tags: &Tags, geometry: FeatureGeometry) -> Self {
        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), json!(element.id));
        for (key, value) in tags {
            properties.insert(key.clone(), json!(value));
        }
        GenericFeature {
            id: element.id,
            element_type: element.element_type,
            properties,
            geometry,
        }
    }

    pub fn element_ref(&self) -> ElementRef {
        ElementRef {
            element_type: self.element_type,
            id: self.id,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.properties.get(key)?.as_str()
    }

    /// Point used to anchor a marker or popup for this feature.
    pub fn anchor(&self) -> Option<Coord> {
        match &self.geometry {
            FeatureGeometry::Point(coord) => Some(*coord),
            FeatureGeometry::LineString(coords) => coords.first().copied(),
            FeatureGeometry::Polygon(polygon) => polygon.first()?.first().copied(),
            FeatureGeometry::MultiPolygon(polygons) => polygons.first()?.first()?.first().copied(),
        }
    }

    pub fn to_geojson(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(self.geometry.to_geojson()),
            id: Some(geojson::feature::Id::Number(self.id.into())),
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

pub fn feature_collection(features: &[GenericFeature]) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features: features.iter().map(GenericFeature::to_geojson).collect(),
        foreign_members: None,
    })
}
