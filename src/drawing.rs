//! Hand-drawn zone polygons: collect clicks into a ring, close it with a
//! double click, then classify it with a zone type.

pub mod area_types;
pub mod overlay;

use std::collections::BTreeMap;

use geo::Coord;
use log::{debug, info, warn};

pub use self::area_types::{area_type_or_fallback, find_area_type, DrawAreaType, DRAW_AREA_TYPES};
use crate::{
    geometry::{encloses_area, format_area, ring_area_m2},
    render::surface::{Cursor, MapSurface},
};

/// A ring closed by double click, waiting for its zone type.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPolygon {
    pub points: Vec<Coord>,
    /// Index the polygon will have once classified.
    pub index: usize,
}

impl PendingPolygon {
    pub fn is_valid_area(&self) -> bool {
        encloses_area(&self.points)
    }

    pub fn area_m2(&self) -> f64 {
        ring_area_m2(&self.points)
    }

    /// Formatted area for the classification dialog, `None` for degenerate rings.
    pub fn area_text(&self) -> Option<String> {
        self.is_valid_area().then(|| format_area(self.area_m2()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPolygon {
    pub points: Vec<Coord>,
    pub area_type: &'static str,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawingState {
    Idle,
    Collecting { ring: Vec<Coord> },
    PendingClassification { pending: PendingPolygon },
}

/// Drawing state plus every classified polygon. Map operations take an
/// optional surface; without one only the state changes.
#[derive(Debug)]
pub struct PolygonDrawing {
    state: DrawingState,
    drawn: Vec<DrawnPolygon>,
    polygon_types: BTreeMap<usize, &'static str>,
}

impl Default for PolygonDrawing {
    fn default() -> Self {
        PolygonDrawing {
            state: DrawingState::Idle,
            drawn: Vec::new(),
            polygon_types: BTreeMap::new(),
        }
    }
}

fn draw_polygon<S: MapSurface>(surface: &mut S, polygon: &DrawnPolygon) {
    if !encloses_area(&polygon.points) {
        warn!(
            index = polygon.index,
            vertices = polygon.points.len();
            "Polygon encloses no area, not rendering it"
        );
        return;
    }
    let area_type = area_type_or_fallback(polygon.area_type);
    overlay::add_completed(surface, &polygon.points, polygon.index, area_type);
}

impl PolygonDrawing {
    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_drawing_mode(&self) -> bool {
        self.state != DrawingState::Idle
    }

    pub fn current_ring(&self) -> &[Coord] {
        match &self.state {
            DrawingState::Collecting { ring } => ring,
            _ => &[],
        }
    }

    pub fn pending(&self) -> Option<&PendingPolygon> {
        match &self.state {
            DrawingState::PendingClassification { pending } => Some(pending),
            _ => None,
        }
    }

    pub fn drawn(&self) -> &[DrawnPolygon] {
        &self.drawn
    }

    pub fn polygon_types(&self) -> &BTreeMap<usize, &'static str> {
        &self.polygon_types
    }

    pub fn enter<S: MapSurface>(&mut self, surface: Option<&mut S>) {
        if let Some(surface) = surface {
            overlay::clear_preview(surface);
            surface.set_cursor(Cursor::Crosshair);
            surface.set_double_click_zoom(false);
        }
        self.state = DrawingState::Collecting { ring: Vec::new() };
        debug!("Entered drawing mode");
    }

    /// Leaves drawing mode from any state. A pending polygon is discarded.
    pub fn exit<S: MapSurface>(&mut self, surface: Option<&mut S>) {
        if let Some(surface) = surface {
            overlay::clear_preview(surface);
            surface.set_cursor(Cursor::Default);
            surface.set_double_click_zoom(true);
        }
        self.state = DrawingState::Idle;
        debug!("Left drawing mode");
    }

    /// Returns whether drawing mode is on afterwards.
    pub fn toggle<S: MapSurface>(&mut self, surface: Option<&mut S>) -> bool {
        if self.is_drawing_mode() {
            self.exit(surface);
        } else {
            self.enter(surface);
        }
        self.is_drawing_mode()
    }

    /// Appends a vertex while collecting. Returns true when drawing mode
    /// consumed the click.
    pub fn click<S: MapSurface>(&mut self, surface: Option<&mut S>, lng_lat: Coord) -> bool {
        match &mut self.state {
            DrawingState::Idle => false,
            DrawingState::PendingClassification { .. } => true,
            DrawingState::Collecting { ring } => {
                ring.push(lng_lat);
                if let Some(surface) = surface {
                    overlay::update_preview(surface, ring);
                }
                true
            }
        }
    }

    /// Closes the current ring once it has two points or more.
    pub fn double_click<S: MapSurface>(
        &mut self,
        surface: Option<&mut S>,
    ) -> Option<&PendingPolygon> {
        let DrawingState::Collecting { ring } = &mut self.state else {
            return None;
        };
        if ring.len() < 2 {
            return None;
        }

        let points = std::mem::take(ring);
        if let Some(surface) = surface {
            overlay::clear_preview(surface);
        }
        info!(vertices = points.len(), index = self.drawn.len(); "Polygon awaiting classification");
        self.state = DrawingState::PendingClassification {
            pending: PendingPolygon {
                points,
                index: self.drawn.len(),
            },
        };
        self.pending()
    }

    /// Persists the pending polygon with the given zone type and goes back
    /// to collecting a fresh ring.
    pub fn classify<S: MapSurface>(
        &mut self,
        surface: Option<&mut S>,
        area_type: &str,
    ) -> Option<&DrawnPolygon> {
        let DrawingState::PendingClassification { pending } = &mut self.state else {
            return None;
        };
        let pending = std::mem::replace(
            pending,
            PendingPolygon {
                points: Vec::new(),
                index: 0,
            },
        );
        self.state = DrawingState::Collecting { ring: Vec::new() };

        let area_type = area_type_or_fallback(area_type).value;
        let polygon = DrawnPolygon {
            points: pending.points,
            area_type,
            index: pending.index,
        };
        if let Some(surface) = surface {
            draw_polygon(surface, &polygon);
        }
        info!(index = polygon.index, area_type = area_type; "Classified polygon");

        self.polygon_types.insert(polygon.index, area_type);
        self.drawn.push(polygon);
        self.drawn.last()
    }

    /// Drops the pending polygon and leaves drawing mode.
    pub fn dismiss<S: MapSurface>(&mut self, surface: Option<&mut S>) {
        if self.pending().is_none() {
            return;
        }
        debug!("Discarded pending polygon");
        self.exit(surface);
    }

    pub fn clear_all<S: MapSurface>(&mut self, surface: Option<&mut S>) {
        if let Some(surface) = surface {
            for polygon in &self.drawn {
                overlay::remove_completed(surface, polygon.index);
            }
            overlay::clear_preview(surface);
        }
        info!(count = self.drawn.len(); "Cleared drawn polygons");

        self.drawn.clear();
        self.polygon_types.clear();
        if self.is_drawing_mode() {
            self.state = DrawingState::Collecting { ring: Vec::new() };
        }
    }

    /// Draws every persisted polygon and the preview again, after the map
    /// style dropped them.
    pub fn rerender<S: MapSurface>(&self, surface: &mut S) {
        for polygon in &self.drawn {
            overlay::remove_completed(surface, polygon.index);
            draw_polygon(surface, polygon);
        }
        overlay::update_preview(surface, self.current_ring());
    }

    pub fn pointer_moved<S: MapSurface>(&self, surface: Option<&mut S>) {
        if let (true, Some(surface)) = (self.is_drawing_mode(), surface) {
            surface.set_cursor(Cursor::Crosshair);
        }
    }

    pub fn pointer_left<S: MapSurface>(&self, surface: Option<&mut S>) {
        if let (true, Some(surface)) = (self.is_drawing_mode(), surface) {
            surface.set_cursor(Cursor::Default);
        }
    }
}
