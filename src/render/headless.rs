use std::{
    collections::BTreeMap,
    f64::consts::PI,
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};

use geo::Coord;
use geojson::GeoJson;
use log::{info, warn};

use super::surface::{Cursor, LayerSpec, MapSurface, MarkerHandle, MarkerSpec, ScreenPoint};
use crate::errors::Result;

const TILE_SIZE: f64 = 512.0;

/// Camera of the headless map. Projection is spherical Web Mercator with
/// 512 px tiles, matching Mapbox GL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: Coord,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for View {
    fn default() -> Self {
        View {
            center: Coord { x: 0.0, y: 0.0 },
            zoom: 14.0,
            width: 1024.0,
            height: 768.0,
        }
    }
}

fn mercator(lng_lat: Coord, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let x = (lng_lat.x + 180.0) / 360.0 * scale;
    let sin = (lng_lat.y * PI / 180.0).sin();
    let y = (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * scale;
    (x, y)
}

/// In-memory map. Keeps an ordered layer stack, GeoJSON sources and markers,
/// and rejects the same misuse a browser map would.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    sources: BTreeMap<String, GeoJson>,
    layers: Vec<LayerSpec>,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    next_marker: u64,
    cursor: Option<Cursor>,
    double_click_zoom: bool,
    style: Option<String>,
    view: View,
}

impl HeadlessSurface {
    pub fn new(view: View) -> Self {
        HeadlessSurface {
            double_click_zoom: true,
            view,
            ..Default::default()
        }
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn source(&self, id: &str) -> Option<&GeoJson> {
        self.sources.get(id)
    }

    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Layer ids bottom to top.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.id.as_str()).collect()
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &MarkerSpec)> {
        self.markers.iter()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor.unwrap_or(Cursor::Default)
    }

    pub fn double_click_zoom(&self) -> bool {
        self.double_click_zoom
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Writes every source to `<dir>/<source id>.geojson`.
    pub fn export(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.sources.len());
        for (id, data) in &self.sources {
            let path = dir.join(format!("{}.geojson", id));
            write(&path, data.to_string())?;
            written.push(path);
        }
        info!(dir = dir.to_string_lossy().as_ref(), sources = written.len(); "Exported sources");
        Ok(written)
    }
}

impl MapSurface for HeadlessSurface {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_source(&mut self, id: &str, data: GeoJson) {
        if self.sources.contains_key(id) {
            warn!(source = id; "Source already exists");
            return;
        }
        self.sources.insert(id.to_string(), data);
    }

    fn set_source_data(&mut self, id: &str, data: GeoJson) {
        match self.sources.get_mut(id) {
            Some(existing) => *existing = data,
            None => warn!(source = id; "Cannot update missing source"),
        }
    }

    fn remove_source(&mut self, id: &str) {
        if let Some(layer) = self.layers.iter().find(|layer| layer.source == id) {
            warn!(source = id, layer = layer.id.as_str(); "Source is still in use");
            return;
        }
        self.sources.remove(id);
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|layer| layer.id == id)
    }

    fn layer_stack(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.id.clone()).collect()
    }

    fn add_layer(&mut self, layer: LayerSpec, before: Option<&str>) {
        if self.has_layer(&layer.id) {
            warn!(layer = layer.id.as_str(); "Layer already exists");
            return;
        }
        if !self.sources.contains_key(&layer.source) {
            warn!(
                layer = layer.id.as_str(),
                source = layer.source.as_str();
                "Layer references missing source"
            );
            return;
        }
        let index = before
            .and_then(|before| self.layers.iter().position(|existing| existing.id == before));
        match index {
            Some(index) => self.layers.insert(index, layer),
            None => self.layers.push(layer),
        }
    }

    fn remove_layer(&mut self, id: &str) {
        self.layers.retain(|layer| layer.id != id);
    }

    fn project(&self, lng_lat: Coord) -> ScreenPoint {
        let (x, y) = mercator(lng_lat, self.view.zoom);
        let (cx, cy) = mercator(self.view.center, self.view.zoom);
        ScreenPoint {
            x: x - cx + self.view.width / 2.0,
            y: y - cy + self.view.height / 2.0,
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    fn set_double_click_zoom(&mut self, enabled: bool) {
        self.double_click_zoom = enabled;
    }

    fn set_style(&mut self, style: &str) {
        self.layers.clear();
        self.sources.clear();
        self.style = Some(style.to_string());
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerHandle {
        let handle = MarkerHandle(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(handle, marker);
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use geojson::FeatureCollection;

    use super::*;
    use crate::render::surface::LayerType;

    fn empty() -> GeoJson {
        GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        })
    }

    #[test]
    fn layers_insert_below_anchor() {
        let mut surface = HeadlessSurface::new(View::default());
        surface.add_source("s", empty());
        surface.add_layer(LayerSpec::new("text", LayerType::Symbol, "s"), None);
        surface.add_layer(LayerSpec::new("bg", LayerType::Symbol, "s"), Some("text"));
        surface.add_layer(LayerSpec::new("top", LayerType::Line, "s"), Some("missing"));
        assert_eq!(surface.layer_ids(), vec!["bg", "text", "top"]);
    }

    #[test]
    fn sources_in_use_are_kept() {
        let mut surface = HeadlessSurface::new(View::default());
        surface.add_source("s", empty());
        surface.add_layer(LayerSpec::new("l", LayerType::Line, "s"), None);
        surface.remove_source("s");
        assert!(surface.has_source("s"));

        surface.remove_layer("l");
        surface.remove_source("s");
        assert!(!surface.has_source("s"));
    }

    #[test]
    fn layers_need_a_source() {
        let mut surface = HeadlessSurface::new(View::default());
        surface.add_layer(LayerSpec::new("l", LayerType::Line, "nowhere"), None);
        assert!(!surface.has_layer("l"));
    }

    #[test]
    fn style_swap_drops_sources_but_keeps_markers() {
        let mut surface = HeadlessSurface::new(View::default());
        surface.add_source("s", empty());
        surface.add_layer(LayerSpec::new("l", LayerType::Line, "s"), None);
        let handle = surface.add_marker(MarkerSpec {
            position: Coord { x: 8.0, y: 48.0 },
            color: "#16a34a".to_string(),
            title: None,
        });

        surface.set_style("mapbox://styles/mapbox/satellite-v9");
        assert!(surface.layer_ids().is_empty());
        assert!(!surface.has_source("s"));
        assert_eq!(surface.markers().count(), 1);

        surface.remove_marker(handle);
        assert_eq!(surface.markers().count(), 0);
    }

    #[test]
    fn center_projects_to_middle_of_viewport() {
        let center = Coord { x: 8.79, y: 47.99 };
        let surface = HeadlessSurface::new(View {
            center,
            ..View::default()
        });
        let point = surface.project(center);
        assert!((point.x - 512.0).abs() < 1e-6);
        assert!((point.y - 384.0).abs() < 1e-6);

        let east = surface.project(Coord { x: 8.8, y: 47.99 });
        let north = surface.project(Coord { x: 8.79, y: 48.0 });
        assert!(east.x > point.x);
        assert!(north.y < point.y);
    }

    #[test]
    fn export_writes_one_file_per_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = HeadlessSurface::new(View::default());
        surface.add_source("railway-lines", empty());
        surface.add_source("landuse-areas", empty());

        let written = surface.export(dir.path()).unwrap();
        assert_eq!(written.len(), 2);
        let body = std::fs::read_to_string(dir.path().join("railway-lines.geojson")).unwrap();
        assert!(body.contains("FeatureCollection"));
    }
}
