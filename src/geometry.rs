//! Plain geometric helpers: search boxes, ring closure, area and label placement.

use std::f64::consts::PI;

use geo::{Centroid, ChamberlainDuquetteArea, Coord, LineString, Polygon};

/// Degrees per kilometre are approximated with 111 km per degree of latitude.
const KM_PER_DEGREE: f64 = 111.0;

/// Below this many square metres an area is printed in m², above in km².
const SQUARE_METRE_LIMIT: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Square box around a centre. Not meaningful near the poles, where the
    /// longitude correction diverges.
    pub fn from_center(lat: f64, lon: f64, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let lon_delta = radius_km / (KM_PER_DEGREE * (lat * PI / 180.0).cos());

        BoundingBox {
            south: lat - lat_delta,
            west: lon - lon_delta,
            north: lat + lat_delta,
            east: lon + lon_delta,
        }
    }

    /// `south,west,north,east`, the order Overpass filters expect.
    pub fn to_overpass(&self) -> String {
        format!("{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

pub fn is_closed(ring: &[Coord]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => first == last,
        _ => true,
    }
}

/// Appends the first vertex when the ring is open. Closed rings are untouched.
pub fn close_ring(ring: &mut Vec<Coord>) {
    if !is_closed(ring) {
        let first = ring[0];
        ring.push(first);
    }
}

pub fn closed(ring: &[Coord]) -> Vec<Coord> {
    let mut ring = ring.to_vec();
    close_ring(&mut ring);
    ring
}

fn polygon(ring: &[Coord]) -> Polygon {
    Polygon::new(LineString::from(closed(ring)), vec![])
}

/// Area on the WGS84 sphere in square metres.
pub fn ring_area_m2(ring: &[Coord]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    polygon(ring).chamberlain_duquette_unsigned_area()
}

/// Geometric centroid of the ring, falling back to the first vertex for
/// degenerate rings.
pub fn ring_centroid(ring: &[Coord]) -> Option<Coord> {
    let first = *ring.first()?;
    Some(polygon(ring).centroid().map(|point| point.0).unwrap_or(first))
}

pub fn format_area(area_m2: f64) -> String {
    let rounded = area_m2.round();
    if rounded < SQUARE_METRE_LIMIT {
        format!("{} m²", rounded)
    } else {
        format!("{:.2} km²", area_m2 / 1_000_000.0)
    }
}

/// Arithmetic mean of the vertices. Used as the marker position of ways.
pub fn mean_point(coords: &[Coord]) -> Option<Coord> {
    if coords.is_empty() {
        return None;
    }
    let n = coords.len() as f64;
    let (x, y) = coords
        .iter()
        .fold((0.0, 0.0), |(x, y), coord| (x + coord.x, y + coord.y));
    Some(Coord { x: x / n, y: y / n })
}

/// Closed polygon approximating a circle of `radius_m` metres.
pub fn circle(center: Coord, radius_m: f64, points: usize) -> Vec<Coord> {
    let distance_x = radius_m / (111_320.0 * (center.y * PI / 180.0).cos());
    let distance_y = radius_m / 110_540.0;

    let mut ring: Vec<Coord> = (0..points)
        .map(|i| {
            let angle = i as f64 * 2.0 * PI / points as f64;
            Coord {
                x: center.x + angle.cos() * distance_x,
                y: center.y + angle.sin() * distance_y,
            }
        })
        .collect();
    close_ring(&mut ring);
    ring
}

/// True when the ring has at least three distinct vertices.
pub fn encloses_area(ring: &[Coord]) -> bool {
    let mut distinct: Vec<Coord> = Vec::with_capacity(ring.len());
    for coord in ring {
        if !distinct.contains(coord) {
            distinct.push(*coord);
        }
    }
    distinct.len() >= 3
}
