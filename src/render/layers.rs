//! One GeoJSON source and one or two style layers per visible category.
//! Every draw replaces what was there; nothing is diffed.

use std::collections::HashMap;

use geo::Coord;
use geojson::{Feature, GeoJson, Geometry, Value as GeometryValue};
use log::debug;
use serde_json::{json, Value};

use super::surface::{LayerSpec, LayerType, MapSurface};
use crate::{
    data::{
        feature::feature_collection, AreaKind, Category, CategoryKind, GenericFeature, LineKind,
        TypeConfig,
    },
    geometry::circle,
};

pub const CIRCLE_SOURCE: &str = "circle-source";
pub const CIRCLE_FILL_LAYER: &str = "circle-layer";
pub const CIRCLE_OUTLINE_LAYER: &str = "circle-outline";
const CIRCLE_POINTS: usize = 64;

/// Which clickable layer belongs to which category. Owned by the session
/// instead of being stashed on the map.
#[derive(Debug, Default)]
pub struct LayerBindings {
    by_layer: HashMap<String, Category>,
}

impl LayerBindings {
    pub fn bind(&mut self, layer: &str, category: Category) {
        self.by_layer.insert(layer.to_string(), category);
    }

    pub fn unbind(&mut self, layer: &str) {
        self.by_layer.remove(layer);
    }

    pub fn category_for(&self, layer: &str) -> Option<Category> {
        self.by_layer.get(layer).copied()
    }

    pub fn len(&self) -> usize {
        self.by_layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_layer.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_layer.clear();
    }
}

pub struct LineIds {
    pub source: String,
    pub layer: String,
}

pub fn line_ids(kind: LineKind) -> LineIds {
    LineIds {
        source: format!("{}-lines", kind.key()),
        layer: format!("{}-lines-layer", kind.key()),
    }
}

pub struct AreaIds {
    pub source: String,
    pub fill: String,
    pub outline: String,
}

pub fn area_ids(kind: AreaKind) -> AreaIds {
    let fill = format!("{}-areas-layer", kind.key());
    AreaIds {
        source: format!("{}-areas", kind.key()),
        outline: format!("{}-outline", fill),
        fill,
    }
}

/// `["case", ["==", ["get", key], value], color, ..., default]`
pub fn color_expression(config: &TypeConfig) -> Value {
    let mut expression = vec![json!("case")];
    for (value, color) in config.colors {
        expression.push(json!(["==", ["get", config.tag_key], value]));
        expression.push(json!(color));
    }
    if expression.len() == 1 {
        return json!(config.default_color);
    }
    expression.push(json!(config.default_color));
    Value::Array(expression)
}

pub fn width_expression(config: &TypeConfig) -> Value {
    let mut expression = vec![json!("case")];
    for (value, width) in config.widths {
        expression.push(json!(["==", ["get", config.tag_key], value]));
        expression.push(json!(width));
    }
    if expression.len() == 1 {
        return json!(config.default_width);
    }
    expression.push(json!(config.default_width));
    Value::Array(expression)
}

pub fn draw_lines<S: MapSurface>(
    surface: &mut S,
    bindings: &mut LayerBindings,
    kind: LineKind,
    features: &[GenericFeature],
) {
    remove_lines(surface, bindings, kind);

    let ids = line_ids(kind);
    let config = kind.config();
    surface.add_source(&ids.source, feature_collection(features));
    surface.add_layer(
        LayerSpec::new(&ids.layer, LayerType::Line, &ids.source)
            .layout(json!({"line-join": "round", "line-cap": "round"}))
            .paint(json!({
                "line-color": color_expression(config),
                "line-width": width_expression(config),
                "line-opacity": 0.8,
            })),
        None,
    );
    bindings.bind(&ids.layer, kind.category());
    debug!(category = kind.key(), count = features.len(); "Drew line layer");
}

/// No-op when the category was never drawn.
pub fn remove_lines<S: MapSurface>(surface: &mut S, bindings: &mut LayerBindings, kind: LineKind) {
    let ids = line_ids(kind);
    bindings.unbind(&ids.layer);
    surface.remove_layer_if_present(&ids.layer);
    surface.remove_source_if_present(&ids.source);
}

/// Fill and outline go below `before` when given, so areas can be shown
/// again underneath lines that are already drawn.
pub fn draw_areas<S: MapSurface>(
    surface: &mut S,
    bindings: &mut LayerBindings,
    kind: AreaKind,
    features: &[GenericFeature],
    before: Option<&str>,
) {
    remove_areas(surface, bindings, kind);

    let ids = area_ids(kind);
    let color = color_expression(kind.config());
    surface.add_source(&ids.source, feature_collection(features));
    surface.add_layer(
        LayerSpec::new(&ids.fill, LayerType::Fill, &ids.source).paint(json!({
            "fill-color": color,
            "fill-opacity": 0.3,
        })),
        before,
    );
    surface.add_layer(
        LayerSpec::new(&ids.outline, LayerType::Line, &ids.source).paint(json!({
            "line-color": color,
            "line-width": 2,
            "line-opacity": 0.8,
        })),
        before,
    );
    bindings.bind(&ids.fill, kind.category());
    debug!(category = kind.key(), count = features.len(); "Drew area layers");
}

pub fn remove_areas<S: MapSurface>(surface: &mut S, bindings: &mut LayerBindings, kind: AreaKind) {
    let ids = area_ids(kind);
    bindings.unbind(&ids.fill);
    surface.remove_layer_if_present(&ids.fill);
    surface.remove_layer_if_present(&ids.outline);
    surface.remove_source_if_present(&ids.source);
}

/// Redraws the translucent search-radius circle around `center`.
pub fn update_circle<S: MapSurface>(surface: &mut S, center: Coord, radius_m: f64) {
    remove_circle(surface);

    let ring: Vec<Vec<f64>> = circle(center, radius_m, CIRCLE_POINTS)
        .iter()
        .map(|coord| vec![coord.x, coord.y])
        .collect();
    let feature = Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeometryValue::Polygon(vec![ring]))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    surface.add_source(CIRCLE_SOURCE, GeoJson::Feature(feature));
    surface.add_layer(
        LayerSpec::new(CIRCLE_FILL_LAYER, LayerType::Fill, CIRCLE_SOURCE)
            .paint(json!({"fill-color": "#ff0000", "fill-opacity": 0.05})),
        None,
    );
    surface.add_layer(
        LayerSpec::new(CIRCLE_OUTLINE_LAYER, LayerType::Line, CIRCLE_SOURCE)
            .paint(json!({"line-color": "#ff0000", "line-width": 2, "line-opacity": 0.8})),
        None,
    );
}

pub fn remove_circle<S: MapSurface>(surface: &mut S) {
    surface.remove_layer_if_present(CIRCLE_FILL_LAYER);
    surface.remove_layer_if_present(CIRCLE_OUTLINE_LAYER);
    surface.remove_source_if_present(CIRCLE_SOURCE);
}
