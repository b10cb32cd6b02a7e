//! Map layers of the drawing tool: the dashed preview of the ring being
//! collected, and the fill, outline and label of each classified polygon.

use geo::Coord;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value as GeometryValue};
use serde_json::json;

use super::area_types::DrawAreaType;
use crate::{
    geometry::{closed, format_area, ring_area_m2, ring_centroid},
    render::surface::{LayerSpec, LayerType, MapSurface},
};

pub const PREVIEW_LINE_SOURCE: &str = "polygon-preview";
pub const PREVIEW_LINE_LAYER: &str = "polygon-preview-line";
pub const PREVIEW_POINTS: &str = "polygon-preview-points";

pub struct PolygonIds {
    pub source: String,
    pub fill: String,
    pub outline: String,
    pub label_source: String,
    pub label_text: String,
    pub label_bg: String,
}

pub fn polygon_ids(index: usize) -> PolygonIds {
    PolygonIds {
        source: format!("completed-polygon-{}", index),
        fill: format!("completed-polygon-fill-{}", index),
        outline: format!("completed-polygon-outline-{}", index),
        label_source: format!("polygon-label-{}", index),
        label_text: format!("polygon-label-text-{}", index),
        label_bg: format!("polygon-label-bg-{}", index),
    }
}

fn position(coord: &Coord) -> Vec<f64> {
    vec![coord.x, coord.y]
}

fn feature(geometry: GeometryValue, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

fn vertices(points: &[Coord]) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features: points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                feature(
                    GeometryValue::Point(position(point)),
                    properties(json!({"index": index})),
                )
            })
            .collect(),
        foreign_members: None,
    })
}

fn preview_points_layer() -> LayerSpec {
    LayerSpec::new(PREVIEW_POINTS, LayerType::Circle, PREVIEW_POINTS).paint(json!({
        "circle-color": "#ff0000",
        "circle-radius": 8,
        "circle-stroke-color": "#ffffff",
        "circle-stroke-width": 3,
    }))
}

/// One highlighted vertex for a single point, a dashed line plus vertices
/// from two points on.
pub fn update_preview<S: MapSurface>(surface: &mut S, points: &[Coord]) {
    if points.is_empty() {
        return;
    }

    if points.len() >= 2 {
        let line = GeoJson::Feature(feature(
            GeometryValue::LineString(points.iter().map(position).collect()),
            JsonObject::new(),
        ));
        surface.upsert_source(PREVIEW_LINE_SOURCE, line);
        if !surface.has_layer(PREVIEW_LINE_LAYER) {
            surface.add_layer(
                LayerSpec::new(PREVIEW_LINE_LAYER, LayerType::Line, PREVIEW_LINE_SOURCE)
                    .paint(json!({
                        "line-color": "#ff0000",
                        "line-width": 4,
                        "line-dasharray": [5, 5],
                    })),
                None,
            );
        }
    }

    surface.upsert_source(PREVIEW_POINTS, vertices(points));
    if !surface.has_layer(PREVIEW_POINTS) {
        surface.add_layer(preview_points_layer(), None);
    }
}

pub fn clear_preview<S: MapSurface>(surface: &mut S) {
    surface.remove_layer_if_present(PREVIEW_LINE_LAYER);
    surface.remove_layer_if_present(PREVIEW_POINTS);
    surface.remove_source_if_present(PREVIEW_LINE_SOURCE);
    surface.remove_source_if_present(PREVIEW_POINTS);
}

/// Fill and outline in the type's color plus a label with area and type
/// name at the centroid. Callers only pass rings that enclose an area.
pub fn add_completed<S: MapSurface>(
    surface: &mut S,
    points: &[Coord],
    index: usize,
    area_type: &DrawAreaType,
) {
    let Some(centroid) = ring_centroid(points) else {
        return;
    };
    let ids = polygon_ids(index);
    let ring: Vec<Vec<f64>> = closed(points).iter().map(position).collect();

    surface.add_source(
        &ids.source,
        GeoJson::Feature(feature(
            GeometryValue::Polygon(vec![ring]),
            properties(json!({"id": index})),
        )),
    );
    surface.add_layer(
        LayerSpec::new(&ids.fill, LayerType::Fill, &ids.source)
            .paint(json!({"fill-color": area_type.color, "fill-opacity": 0.3})),
        None,
    );
    surface.add_layer(
        LayerSpec::new(&ids.outline, LayerType::Line, &ids.source)
            .paint(json!({"line-color": area_type.color, "line-width": 3})),
        None,
    );

    let label = properties(json!({
        "area": format_area(ring_area_m2(points)),
        "type": area_type.name,
    }));
    surface.add_source(
        &ids.label_source,
        GeoJson::Feature(feature(GeometryValue::Point(position(&centroid)), label)),
    );
    surface.add_layer(
        LayerSpec::new(&ids.label_text, LayerType::Symbol, &ids.label_source)
            .layout(json!({
                "text-field": ["concat", ["get", "area"], "\n", ["get", "type"]],
                "text-font": ["Open Sans Bold", "Arial Unicode MS Bold"],
                "text-size": 12,
                "text-anchor": "center",
                "text-line-height": 1.2,
            }))
            .paint(json!({
                "text-color": "#000000",
                "text-halo-color": "#ffffff",
                "text-halo-width": 2,
            })),
        None,
    );
    surface.add_layer(
        LayerSpec::new(&ids.label_bg, LayerType::Circle, &ids.label_source).paint(json!({
            "circle-color": "#ffffff",
            "circle-opacity": 0.9,
            "circle-radius": 35,
            "circle-stroke-color": area_type.color,
            "circle-stroke-width": 3,
        })),
        Some(&ids.label_text),
    );
}

pub fn remove_completed<S: MapSurface>(surface: &mut S, index: usize) {
    let ids = polygon_ids(index);
    surface.remove_layer_if_present(&ids.fill);
    surface.remove_layer_if_present(&ids.outline);
    surface.remove_source_if_present(&ids.source);
    surface.remove_layer_if_present(&ids.label_text);
    surface.remove_layer_if_present(&ids.label_bg);
    surface.remove_source_if_present(&ids.label_source);
}
