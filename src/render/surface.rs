use geo::Coord;
use geojson::GeoJson;
use serde_json::{json, Value};

use crate::data::OsmId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
    Crosshair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerType {
    Fill,
    Line,
    Circle,
    Symbol,
}

/// A style layer in the Mapbox GL sense. `paint` and `layout` hold style
/// expressions verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub layer_type: LayerType,
    pub source: String,
    pub layout: Value,
    pub paint: Value,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, layer_type: LayerType, source: impl Into<String>) -> Self {
        LayerSpec {
            id: id.into(),
            layer_type,
            source: source.into(),
            layout: json!({}),
            paint: json!({}),
        }
    }

    pub fn paint(mut self, paint: Value) -> Self {
        self.paint = paint;
        self
    }

    pub fn layout(mut self, layout: Value) -> Self {
        self.layout = layout;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: Coord,
    pub color: String,
    pub title: Option<String>,
}

/// The map the session draws on. Sources and layers are owned by the
/// current style and vanish when the style is swapped; markers survive.
pub trait MapSurface {
    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, data: GeoJson);
    fn set_source_data(&mut self, id: &str, data: GeoJson);
    fn remove_source(&mut self, id: &str);

    fn has_layer(&self, id: &str) -> bool;
    /// Layer ids bottom to top.
    fn layer_stack(&self) -> Vec<String>;
    /// Inserts below `before` when given, on top otherwise.
    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>);
    fn remove_layer(&mut self, id: &str);

    fn project(&self, lng_lat: Coord) -> ScreenPoint;
    fn set_cursor(&mut self, cursor: Cursor);
    fn set_double_click_zoom(&mut self, enabled: bool);
    fn set_style(&mut self, style: &str);

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerHandle;
    fn remove_marker(&mut self, handle: MarkerHandle);

    fn remove_layer_if_present(&mut self, id: &str) {
        if self.has_layer(id) {
            self.remove_layer(id);
        }
    }

    fn remove_source_if_present(&mut self, id: &str) {
        if self.has_source(id) {
            self.remove_source(id);
        }
    }

    fn upsert_source(&mut self, id: &str, data: GeoJson) {
        if self.has_source(id) {
            self.set_source_data(id, data);
        } else {
            self.add_source(id, data);
        }
    }
}

/// The rendered feature under the pointer, as reported by the host's hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerHit {
    pub layer: String,
    pub feature_id: OsmId,
}

/// Pointer and lifecycle events the host forwards to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Click { lng_lat: Coord, hit: Option<LayerHit> },
    DoubleClick { lng_lat: Coord },
    MouseMove { lng_lat: Coord },
    MouseLeave,
    LayerEnter { layer: String },
    LayerLeave { layer: String },
    MarkerClick { key: String },
    StyleLoaded,
}
