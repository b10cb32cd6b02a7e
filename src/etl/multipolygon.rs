//! Stitches the member ways of a multipolygon relation into closed rings.

use geo::{Contains, Coord, LineString, Point, Polygon};
use log::debug;

use crate::data::{feature::Ring, osm::{ElementType, RawMember}, FeatureGeometry};

/// Joins open way fragments end to end. Fragments that never close are dropped.
fn stitch(mut fragments: Vec<Vec<Coord>>) -> Vec<Ring> {
    let mut rings = Vec::new();

    while let Some(mut current) = fragments.pop() {
        loop {
            let ends = (current.first().copied(), current.last().copied());
            let (Some(first), Some(last)) = ends else {
                break;
            };
            if current.len() > 1 && first == last {
                break;
            }

            let next = fragments
                .iter()
                .position(|way| way.first() == Some(&last) || way.last() == Some(&last));
            let Some(index) = next else {
                break;
            };
            let mut way = fragments.swap_remove(index);
            if way.first() != Some(&last) {
                way.reverse();
            }
            current.extend_from_slice(&way[1..]);
        }

        if current.len() >= 4 && current.first() == current.last() {
            rings.push(current);
        } else {
            debug!(vertices = current.len(); "Dropping unclosed multipolygon fragment");
        }
    }

    rings
}

fn contains(outer: &Ring, coord: Coord) -> bool {
    Polygon::new(LineString::from(outer.clone()), vec![]).contains(&Point::from(coord))
}

/// Outer rings become polygons, inner rings become holes of the outer ring
/// containing their first vertex. `None` when no outer ring closes.
pub fn resolve(members: &[RawMember]) -> Option<FeatureGeometry> {
    let mut outers = Vec::new();
    let mut inners = Vec::new();

    for member in members {
        if member.member_type != ElementType::Way {
            continue;
        }
        let coords = member.coords();
        if coords.len() < 2 {
            continue;
        }
        match member.role.as_str() {
            "inner" => inners.push(coords),
            _ => outers.push(coords),
        }
    }

    let mut polygons: Vec<Vec<Ring>> = stitch(outers).into_iter().map(|ring| vec![ring]).collect();
    for inner in stitch(inners) {
        let host = polygons.iter_mut().find(|polygon| contains(&polygon[0], inner[0]));
        match host {
            Some(polygon) => polygon.push(inner),
            None => debug!(vertices = inner.len(); "Inner ring outside every outer ring"),
        }
    }

    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(FeatureGeometry::Polygon),
        _ => Some(FeatureGeometry::MultiPolygon(polygons)),
    }
}
