//! One map, one round at a time: fetch, draw, inspect, draw zones, reset.

use std::collections::HashSet;

use geo::Coord;
use log::{debug, error, info, warn};

use crate::{
    config::UserConfig,
    data::{AreaKind, Category, CategoryKind, GenericFeature, LineKind, NodeKind, RoundData, Shape},
    drawing::{DrawnPolygon, PendingPolygon, PolygonDrawing},
    errors::Result,
    etl::{features::fetch_round, overpass::ElementSource},
    geometry::BoundingBox,
    render::{
        layers::{draw_areas, draw_lines, line_ids, remove_areas, remove_lines, update_circle},
        Cursor, LayerBindings, MapEvent, MapSurface, MarkerRegistry, ScreenPoint,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    Loading,
    Playing,
}

/// The feature whose details are open, with the pixel the dialog points at.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFeature {
    pub category: Category,
    pub feature: GenericFeature,
    pub screen_point: ScreenPoint,
}

/// Proof of which round a fetch result belongs to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundTicket {
    pub generation: u64,
    pub bbox: BoundingBox,
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// Draws every visible category of the round: areas, then lines, then markers.
fn draw_round<S: MapSurface>(
    surface: &mut S,
    data: &RoundData,
    hidden: &HashSet<Category>,
    bindings: &mut LayerBindings,
    markers: &mut MarkerRegistry,
) {
    let visible = |category: Category| !hidden.contains(&category);

    for &kind in AreaKind::ALL {
        let features = data.areas.get(kind);
        if visible(kind.category()) && !features.is_empty() {
            draw_areas(surface, bindings, kind, features, None);
        }
    }
    for &kind in LineKind::ALL {
        let features = data.lines.get(kind);
        if visible(kind.category()) && !features.is_empty() {
            draw_lines(surface, bindings, kind, features);
        }
    }
    markers.remove_all(surface);
    for &kind in NodeKind::ALL {
        let features = data.nodes.get(kind);
        if visible(kind.category()) && !features.is_empty() {
            markers.add(surface, kind, features);
        }
    }
}

fn clear_round<S: MapSurface>(
    surface: &mut S,
    bindings: &mut LayerBindings,
    markers: &mut MarkerRegistry,
) {
    for &kind in LineKind::ALL {
        remove_lines(surface, bindings, kind);
    }
    for &kind in AreaKind::ALL {
        remove_areas(surface, bindings, kind);
    }
    markers.remove_all(surface);
}

/// Owns everything drawn on one map. The surface is optional; without one
/// every operation updates state only.
pub struct MapSession<S: MapSurface> {
    surface: Option<S>,
    center: Coord,
    radius_m: f64,
    timeout_s: u32,
    style: String,
    state: RoundState,
    generation: u64,
    hidden: HashSet<Category>,
    data: RoundData,
    selected: Option<SelectedFeature>,
    markers: MarkerRegistry,
    bindings: LayerBindings,
    drawing: PolygonDrawing,
}

impl<S: MapSurface> MapSession<S> {
    pub fn new(config: &UserConfig) -> Self {
        MapSession {
            surface: None,
            center: Coord {
                x: round5(config.center_lon),
                y: round5(config.center_lat),
            },
            radius_m: config.radius_m,
            timeout_s: config.overpass_timeout_s,
            style: config.map_style.clone(),
            state: RoundState::Idle,
            generation: 0,
            hidden: HashSet::new(),
            data: RoundData::default(),
            selected: None,
            markers: MarkerRegistry::default(),
            bindings: LayerBindings::default(),
            drawing: PolygonDrawing::default(),
        }
    }

    /// Hands the loaded map to the session, applies the style and draws
    /// whatever the session already holds.
    pub fn attach(&mut self, mut surface: S) {
        surface.set_style(&self.style);
        self.surface = Some(surface);
        self.redraw_all();
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn data(&self) -> &RoundData {
        &self.data
    }

    pub fn selected(&self) -> Option<&SelectedFeature> {
        self.selected.as_ref()
    }

    pub fn drawing(&self) -> &PolygonDrawing {
        &self.drawing
    }

    pub fn center(&self) -> Coord {
        self.center
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn is_visible(&self, category: Category) -> bool {
        !self.hidden.contains(&category)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_center(self.center.y, self.center.x, self.radius_m / 1000.0)
    }

    fn draw_circle(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            update_circle(surface, self.center, self.radius_m);
        }
    }

    /// Moves the search centre, rounded to five decimals (about a metre).
    pub fn set_center(&mut self, lng: f64, lat: f64) {
        self.center = Coord {
            x: round5(lng),
            y: round5(lat),
        };
        debug!(lng = self.center.x, lat = self.center.y; "Moved search centre");
        self.draw_circle();
    }

    pub fn set_radius(&mut self, radius_m: f64) {
        self.radius_m = radius_m;
        self.draw_circle();
    }

    pub fn begin_round(&mut self) -> RoundTicket {
        self.generation += 1;
        self.state = RoundState::Loading;
        self.selected = None;
        let bbox = self.bounding_box();
        info!(generation = self.generation, bbox = bbox.to_overpass().as_str(); "Starting round");
        RoundTicket {
            generation: self.generation,
            bbox,
        }
    }

    /// Applies a fetched round. Results of a superseded round are dropped
    /// and reported as `Ok(false)`; a failed fetch sends the session back
    /// to idle and is returned.
    pub fn finish_round(&mut self, ticket: RoundTicket, result: Result<RoundData>) -> Result<bool> {
        if ticket.generation != self.generation || self.state != RoundState::Loading {
            warn!(
                ticket = ticket.generation,
                current = self.generation;
                "Dropping result of a superseded round"
            );
            return Ok(false);
        }

        let data = match result {
            Ok(data) => data,
            Err(err) => {
                error!(generation = ticket.generation, err = err.message.as_str(); "Round failed");
                self.state = RoundState::Idle;
                return Err(err);
            }
        };

        if let Some(surface) = self.surface.as_mut() {
            clear_round(surface, &mut self.bindings, &mut self.markers);
            draw_round(surface, &data, &self.hidden, &mut self.bindings, &mut self.markers);
        }
        info!(
            generation = ticket.generation,
            lines = data.lines.total(),
            nodes = data.nodes.total(),
            areas = data.areas.total();
            "Round ready"
        );
        self.data = data;
        self.state = RoundState::Playing;
        Ok(true)
    }

    /// Fetches lines, nodes and areas around the centre and draws them.
    pub async fn start_round<F: ElementSource>(&mut self, source: &F) -> Result<()> {
        let ticket = self.begin_round();
        let result = fetch_round(source, ticket.bbox, self.timeout_s).await;
        self.finish_round(ticket, result).map(|_| ())
    }

    pub fn reset_round(&mut self) {
        self.generation += 1;
        self.state = RoundState::Idle;
        self.selected = None;
        if let Some(surface) = self.surface.as_mut() {
            clear_round(surface, &mut self.bindings, &mut self.markers);
        }
        self.data = RoundData::default();
        self.drawing.clear_all(self.surface.as_mut());
        info!(generation = self.generation; "Round reset");
    }

    pub fn close_selection(&mut self) {
        self.selected = None;
    }

    fn select(&mut self, category: Category, feature: Option<GenericFeature>, lng_lat: Coord) {
        let Some(surface) = self.surface.as_ref() else {
            return;
        };
        let Some(feature) = feature else {
            debug!(category = category.key(); "Clicked feature is not part of the round");
            return;
        };
        self.selected = Some(SelectedFeature {
            category,
            feature,
            screen_point: surface.project(lng_lat),
        });
    }

    /// Lowest line layer on the map, if any, so areas shown later stay below lines.
    fn first_line_layer(&self) -> Option<String> {
        let surface = self.surface.as_ref()?;
        let lines: Vec<String> = LineKind::ALL.iter().map(|kind| line_ids(*kind).layer).collect();
        surface.layer_stack().into_iter().find(|layer| lines.contains(layer))
    }

    pub fn toggle_category_visibility(&mut self, category: Category, show: bool) {
        if show {
            self.hidden.remove(&category);
        } else {
            self.hidden.insert(category);
            if self.selected.as_ref().map(|selected| selected.category) == Some(category) {
                self.selected = None;
            }
        }

        let before = self.first_line_layer();
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let features = self.data.features(category);
        let draw = show && !features.is_empty();
        match category {
            Category::Line(kind) if draw => draw_lines(surface, &mut self.bindings, kind, features),
            Category::Line(kind) => remove_lines(surface, &mut self.bindings, kind),
            Category::Area(kind) if draw => {
                draw_areas(surface, &mut self.bindings, kind, features, before.as_deref())
            }
            Category::Area(kind) => remove_areas(surface, &mut self.bindings, kind),
            Category::Node(kind) => {
                self.markers.remove_by_category(surface, kind);
                if draw {
                    self.markers.add(surface, kind, features);
                }
            }
        }
        debug!(category = category.key(), show = show; "Toggled category");
    }

    /// Same as `toggle_category_visibility`, for categories named by key.
    pub fn toggle_category_visibility_by_key(
        &mut self,
        shape: Shape,
        key: &str,
        show: bool,
    ) -> Result<()> {
        let category = Category::parse(shape, key)?;
        self.toggle_category_visibility(category, show);
        Ok(())
    }

    /// Returns whether drawing mode is on afterwards.
    pub fn toggle_drawing_mode(&mut self) -> bool {
        if !self.drawing.is_drawing_mode() {
            self.selected = None;
        }
        self.drawing.toggle(self.surface.as_mut())
    }

    pub fn pending_polygon(&self) -> Option<&PendingPolygon> {
        self.drawing.pending()
    }

    pub fn classify_pending_polygon(&mut self, area_type: &str) -> Option<&DrawnPolygon> {
        self.drawing.classify(self.surface.as_mut(), area_type)
    }

    pub fn dismiss_pending_polygon(&mut self) {
        self.drawing.dismiss(self.surface.as_mut());
    }

    pub fn clear_all_polygons(&mut self) {
        self.drawing.clear_all(self.surface.as_mut());
    }

    /// Swaps the base style. Layers come back on `MapEvent::StyleLoaded`.
    pub fn set_style(&mut self, style: &str) {
        self.style = style.to_string();
        if let Some(surface) = self.surface.as_mut() {
            self.markers.remove_all(surface);
            self.bindings.clear();
            surface.set_style(style);
        }
        info!(style = style; "Switching map style");
    }

    fn redraw_all(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        update_circle(surface, self.center, self.radius_m);
        draw_round(surface, &self.data, &self.hidden, &mut self.bindings, &mut self.markers);
        self.drawing.rerender(surface);
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if let Some(surface) = self.surface.as_mut() {
            surface.set_cursor(cursor);
        }
    }

    /// Single entry point for map interaction. Drawing mode takes clicks
    /// first; feature inspection only happens outside it.
    pub fn handle_event(&mut self, event: MapEvent) {
        match event {
            MapEvent::Click { lng_lat, hit } => {
                if self.drawing.click(self.surface.as_mut(), lng_lat) {
                    return;
                }
                let Some(hit) = hit else {
                    return;
                };
                if let Some(category) = self.bindings.category_for(&hit.layer) {
                    let feature = self.data.find_id(category, hit.feature_id).cloned();
                    self.select(category, feature, lng_lat);
                }
            }
            MapEvent::DoubleClick { .. } => {
                self.drawing.double_click(self.surface.as_mut());
            }
            MapEvent::MouseMove { .. } => self.drawing.pointer_moved(self.surface.as_mut()),
            MapEvent::MouseLeave => self.drawing.pointer_left(self.surface.as_mut()),
            MapEvent::LayerEnter { layer } => {
                if !self.drawing.is_drawing_mode() && self.bindings.category_for(&layer).is_some() {
                    self.set_cursor(Cursor::Pointer);
                }
            }
            MapEvent::LayerLeave { layer } => {
                if !self.drawing.is_drawing_mode() && self.bindings.category_for(&layer).is_some() {
                    self.set_cursor(Cursor::Default);
                }
            }
            MapEvent::MarkerClick { key } => {
                if self.drawing.is_drawing_mode() {
                    return;
                }
                let Some((kind, element)) = self.markers.resolve(&key) else {
                    return;
                };
                let category = kind.category();
                let feature = self.data.find(category, element).cloned();
                if let Some(anchor) = feature.as_ref().and_then(GenericFeature::anchor) {
                    self.select(category, feature, anchor);
                }
            }
            MapEvent::StyleLoaded => self.redraw_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::OsmId,
        errors::ErrorKind,
        render::{
            headless::{HeadlessSurface, View},
            layers::{CIRCLE_FILL_LAYER, CIRCLE_OUTLINE_LAYER},
            LayerHit,
        },
        testing::{CannedSource, SAMPLE},
    };

    fn config() -> UserConfig {
        UserConfig {
            center_lon: 8.005,
            center_lat: 48.005,
            ..UserConfig::default()
        }
    }

    fn session() -> MapSession<HeadlessSurface> {
        let mut session = MapSession::new(&config());
        session.attach(HeadlessSurface::new(View {
            center: Coord { x: 8.005, y: 48.005 },
            ..View::default()
        }));
        session
    }

    fn layers(session: &MapSession<HeadlessSurface>) -> Vec<String> {
        session
            .surface()
            .unwrap()
            .layer_ids()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn position(layers: &[String], id: &str) -> usize {
        layers.iter().position(|layer| layer == id).unwrap()
    }

    fn marker_count(session: &MapSession<HeadlessSurface>) -> usize {
        session.surface().unwrap().markers().count()
    }

    fn click(lng: f64, lat: f64, hit: Option<(&str, OsmId)>) -> MapEvent {
        MapEvent::Click {
            lng_lat: Coord { x: lng, y: lat },
            hit: hit.map(|(layer, feature_id)| LayerHit {
                layer: layer.to_string(),
                feature_id,
            }),
        }
    }

    #[tokio::test]
    async fn round_draws_areas_below_lines_and_adds_markers() {
        let mut session = session();
        session.start_round(&CannedSource::new(SAMPLE)).await.unwrap();

        assert_eq!(session.state(), RoundState::Playing);
        let layers = layers(&session);
        assert!(
            position(&layers, "landuse-areas-layer") < position(&layers, "railway-lines-layer")
        );
        let outline = position(&layers, "landuse-areas-layer-outline");
        assert!(outline < position(&layers, "highway-lines-layer"));
        assert!(position(&layers, CIRCLE_OUTLINE_LAYER) < position(&layers, "landuse-areas-layer"));
        assert_eq!(marker_count(&session), 2);
    }

    #[tokio::test]
    async fn failed_round_returns_to_idle() {
        let mut session = session();
        let err = session.start_round(&CannedSource::failing(504)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Http { status: 504 });
        assert_eq!(session.state(), RoundState::Idle);
        assert_eq!(session.data().total(), 0);
        assert_eq!(layers(&session), vec![CIRCLE_FILL_LAYER, CIRCLE_OUTLINE_LAYER]);
    }

    #[tokio::test]
    async fn late_results_of_a_reset_round_are_ignored() {
        let mut session = session();
        let source = CannedSource::new(SAMPLE);

        let ticket = session.begin_round();
        session.reset_round();
        let result = fetch_round(&source, ticket.bbox, 25).await;
        assert!(!session.finish_round(ticket, result).unwrap());
        assert_eq!(session.state(), RoundState::Idle);
        assert_eq!(session.data().total(), 0);
        assert_eq!(marker_count(&session), 0);

        let first = session.begin_round();
        let second = session.begin_round();
        let stale = fetch_round(&source, first.bbox, 25).await;
        assert!(!session.finish_round(first, stale).unwrap());
        let fresh = fetch_round(&source, second.bbox, 25).await;
        assert!(session.finish_round(second, fresh).unwrap());
        assert_eq!(session.state(), RoundState::Playing);
    }

    #[tokio::test]
    async fn reset_then_restart_shows_the_same_round() {
        let mut session = session();
        let source = CannedSource::new(SAMPLE);
        session.start_round(&source).await.unwrap();
        let first_layers = layers(&session);
        let first_data = session.data().clone();

        session.reset_round();
        assert_eq!(layers(&session), vec![CIRCLE_FILL_LAYER, CIRCLE_OUTLINE_LAYER]);
        assert_eq!(marker_count(&session), 0);
        assert_eq!(session.data().total(), 0);

        session.start_round(&source).await.unwrap();
        assert_eq!(layers(&session), first_layers);
        assert_eq!(session.data(), &first_data);
        assert_eq!(marker_count(&session), 2);
    }

    #[tokio::test]
    async fn drawing_mode_and_inspection_exclude_each_other() {
        let mut session = session();
        session.start_round(&CannedSource::new(SAMPLE)).await.unwrap();

        session.handle_event(click(8.0, 48.005, Some(("highway-lines-layer", 2))));
        let selected = session.selected().unwrap();
        assert_eq!(selected.category, Category::Line(LineKind::Highway));
        assert_eq!(selected.feature.tag("name"), Some("B14"));

        assert!(session.toggle_drawing_mode());
        assert!(session.selected().is_none());

        session.handle_event(click(8.0, 48.005, Some(("highway-lines-layer", 2))));
        assert!(session.selected().is_none());
        assert_eq!(session.drawing().current_ring().len(), 1);

        session.handle_event(MapEvent::MarkerClick { key: "tree-n3".to_string() });
        assert!(session.selected().is_none());
    }

    #[tokio::test]
    async fn marker_click_projects_the_node() {
        let mut session = session();
        session.start_round(&CannedSource::new(SAMPLE)).await.unwrap();

        session.handle_event(MapEvent::MarkerClick { key: "tree-n3".to_string() });
        let selected = session.selected().unwrap();
        let expected = session.surface().unwrap().project(Coord { x: 8.001, y: 48.001 });
        assert_eq!(selected.category, Category::Node(NodeKind::Tree));
        assert_eq!(selected.screen_point, expected);

        session.close_selection();
        assert!(session.selected().is_none());
    }

    #[tokio::test]
    async fn marker_click_picks_the_way_not_the_node_with_its_id() {
        let mut session = session();
        let body = r#"{"elements": [
            {"type": "node", "id": 7, "lat": 48.001, "lon": 8.001, "tags": {"natural": "tree", "name": "node"}},
            {"type": "way", "id": 7, "tags": {"natural": "tree", "name": "way"},
             "geometry": [{"lat": 48.002, "lon": 8.002}, {"lat": 48.004, "lon": 8.004}]}
        ]}"#;
        session.start_round(&CannedSource::new(body)).await.unwrap();
        assert_eq!(session.data().nodes.get(NodeKind::Tree).len(), 2);
        assert_eq!(marker_count(&session), 2);

        session.handle_event(MapEvent::MarkerClick { key: "tree-w7".to_string() });
        assert_eq!(session.selected().unwrap().feature.tag("name"), Some("way"));
        session.handle_event(MapEvent::MarkerClick { key: "tree-n7".to_string() });
        assert_eq!(session.selected().unwrap().feature.tag("name"), Some("node"));
    }

    #[tokio::test]
    async fn hiding_a_category_removes_it_and_its_selection() {
        let mut session = session();
        session.start_round(&CannedSource::new(SAMPLE)).await.unwrap();
        session.handle_event(click(8.0, 48.005, Some(("highway-lines-layer", 2))));

        session.toggle_category_visibility(Category::Line(LineKind::Highway), false);
        assert!(session.selected().is_none());
        assert!(!layers(&session).contains(&"highway-lines-layer".to_string()));
        assert!(!session.is_visible(Category::Line(LineKind::Highway)));

        session.toggle_category_visibility(Category::Line(LineKind::Highway), true);
        assert!(layers(&session).contains(&"highway-lines-layer".to_string()));

        session.toggle_category_visibility(Category::Node(NodeKind::Tree), false);
        assert_eq!(marker_count(&session), 1);
    }

    #[tokio::test]
    async fn areas_shown_again_stay_below_lines() {
        let mut session = session();
        session.start_round(&CannedSource::new(SAMPLE)).await.unwrap();

        session.toggle_category_visibility(Category::Line(LineKind::Railway), false);
        session.toggle_category_visibility(Category::Line(LineKind::Railway), true);
        session.toggle_category_visibility(Category::Area(AreaKind::Landuse), false);
        session.toggle_category_visibility(Category::Area(AreaKind::Landuse), true);
        let layers = layers(&session);
        let outline = position(&layers, "landuse-areas-layer-outline");
        assert!(outline < position(&layers, "highway-lines-layer"));
        assert!(
            position(&layers, "highway-lines-layer") < position(&layers, "railway-lines-layer")
        );
    }

    #[test]
    fn unknown_category_keys_are_rejected() {
        let mut session = session();
        let err = session
            .toggle_category_visibility_by_key(Shape::Line, "canal", false)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedCategory);
        assert!(session
            .toggle_category_visibility_by_key(Shape::Node, "power_pole", false)
            .is_ok());
        assert!(!session.is_visible(Category::Node(NodeKind::PowerPole)));
    }

    #[tokio::test]
    async fn style_swap_redraws_round_circle_and_polygons() {
        let mut session = session();
        session.start_round(&CannedSource::new(SAMPLE)).await.unwrap();
        session.toggle_drawing_mode();
        for (lng, lat) in [(8.0, 48.0), (8.01, 48.0), (8.01, 48.01)] {
            session.handle_event(click(lng, lat, None));
        }
        session.handle_event(MapEvent::DoubleClick { lng_lat: Coord { x: 8.01, y: 48.01 } });
        session.classify_pending_polygon("danger").unwrap();

        session.set_style("mapbox://styles/mapbox/satellite-streets-v12");
        assert!(layers(&session).is_empty());
        assert_eq!(marker_count(&session), 0);

        session.handle_event(MapEvent::StyleLoaded);
        let layers = layers(&session);
        assert!(
            position(&layers, "landuse-areas-layer") < position(&layers, "railway-lines-layer")
        );
        assert!(position(&layers, CIRCLE_OUTLINE_LAYER) < position(&layers, "landuse-areas-layer"));
        assert!(layers.contains(&"completed-polygon-fill-0".to_string()));
        assert_eq!(marker_count(&session), 2);
        assert_eq!(
            session.surface().unwrap().style(),
            Some("mapbox://styles/mapbox/satellite-streets-v12")
        );
    }

    #[tokio::test]
    async fn reset_clears_drawn_polygons() {
        let mut session = session();
        session.toggle_drawing_mode();
        for (lng, lat) in [(8.0, 48.0), (8.01, 48.0), (8.01, 48.01)] {
            session.handle_event(click(lng, lat, None));
        }
        session.handle_event(MapEvent::DoubleClick { lng_lat: Coord { x: 8.01, y: 48.01 } });
        assert!(session.pending_polygon().unwrap().is_valid_area());
        session.classify_pending_polygon("heli").unwrap();

        session.reset_round();
        assert!(session.drawing().drawn().is_empty());
        assert_eq!(layers(&session), vec![CIRCLE_FILL_LAYER, CIRCLE_OUTLINE_LAYER]);
    }

    #[test]
    fn hover_shows_pointer_only_outside_drawing_mode() {
        let mut session = session();
        session.bindings.bind("railway-lines-layer", Category::Line(LineKind::Railway));

        session.handle_event(MapEvent::LayerEnter { layer: "railway-lines-layer".to_string() });
        assert_eq!(session.surface().unwrap().cursor(), Cursor::Pointer);
        session.handle_event(MapEvent::LayerLeave { layer: "railway-lines-layer".to_string() });
        assert_eq!(session.surface().unwrap().cursor(), Cursor::Default);

        session.toggle_drawing_mode();
        session.handle_event(MapEvent::LayerEnter { layer: "railway-lines-layer".to_string() });
        assert_eq!(session.surface().unwrap().cursor(), Cursor::Crosshair);
        session.handle_event(MapEvent::MouseLeave);
        assert_eq!(session.surface().unwrap().cursor(), Cursor::Default);
        session.handle_event(MapEvent::MouseMove { lng_lat: Coord { x: 8.0, y: 48.0 } });
        assert_eq!(session.surface().unwrap().cursor(), Cursor::Crosshair);
    }

    #[test]
    fn centre_is_rounded_and_circle_follows() {
        let mut session = session();
        session.set_center(8.123456789, 47.987654321);
        assert_eq!(session.center(), Coord { x: 8.12346, y: 47.98765 });
        session.set_radius(1000.0);

        let bbox = session.bounding_box();
        assert!((bbox.north - (47.98765 + 1.0 / 111.0)).abs() < 1e-9);
        assert_eq!(layers(&session), vec![CIRCLE_FILL_LAYER, CIRCLE_OUTLINE_LAYER]);
    }

    #[tokio::test]
    async fn works_without_a_map() {
        let mut session: MapSession<HeadlessSurface> = MapSession::new(&config());
        session.start_round(&CannedSource::new(SAMPLE)).await.unwrap();
        assert_eq!(session.state(), RoundState::Playing);
        assert_eq!(session.data().total(), 5);

        assert!(session.toggle_drawing_mode());
        session.handle_event(click(8.0, 48.0, None));
        session.handle_event(click(8.01, 48.0, None));
        session.handle_event(MapEvent::DoubleClick { lng_lat: Coord { x: 8.01, y: 48.0 } });
        assert_eq!(session.classify_pending_polygon("rescue").unwrap().index, 0);
        session.set_style("mapbox://styles/mapbox/dark-v11");
        session.reset_round();
        assert_eq!(session.state(), RoundState::Idle);
    }
}
