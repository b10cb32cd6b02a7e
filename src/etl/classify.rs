use log::debug;

use super::multipolygon;
use crate::{
    data::{
        osm::ElementType, CategoryKind, Classified, FeatureGeometry, GenericFeature, RawElement,
        Shape,
    },
    geometry::{close_ring, mean_point},
};

fn eligible(shape: Shape, element_type: ElementType) -> bool {
    match (shape, element_type) {
        (_, ElementType::Other) => false,
        (Shape::Node, _) => true,
        (Shape::Line | Shape::Area, ElementType::Node) => false,
        (Shape::Line | Shape::Area, _) => true,
    }
}

fn geometry(shape: Shape, element: &RawElement) -> Option<FeatureGeometry> {
    match (shape, element.element_type) {
        (Shape::Line, ElementType::Way) => {
            let coords = element.coords();
            (coords.len() >= 2).then_some(FeatureGeometry::LineString(coords))
        }
        (Shape::Area, ElementType::Way) => {
            let mut ring = element.coords();
            if ring.len() < 3 {
                return None;
            }
            close_ring(&mut ring);
            Some(FeatureGeometry::Polygon(vec![ring]))
        }
        (Shape::Area, ElementType::Relation) => {
            if element.tag("type") != Some("multipolygon") {
                return None;
            }
            multipolygon::resolve(&element.members)
        }
        (Shape::Node, ElementType::Node) => element.position().map(FeatureGeometry::Point),
        (Shape::Node, ElementType::Way) => {
            mean_point(&element.coords()).map(FeatureGeometry::Point)
        }
        _ => None,
    }
}

/// Buckets raw elements into the given categories. The first category in
/// `kinds` whose filter matches claims the element; later ones never see it.
pub fn classify<K: CategoryKind>(elements: &[RawElement], kinds: &[K]) -> Classified<K> {
    let mut result = Classified::empty(kinds);
    let mut dropped = 0usize;

    for element in elements {
        let Some(tags) = &element.tags else {
            continue;
        };
        if !eligible(K::SHAPE, element.element_type) {
            continue;
        }
        let Some(kind) = kinds.iter().copied().find(|kind| kind.config().matches(tags)) else {
            continue;
        };

        match geometry(K::SHAPE, element) {
            Some(geometry) => {
                result.push(kind, GenericFeature::new(element.element_ref(), tags, geometry))
            }
            None => {
                debug!(
                    category = kind.key(),
                    id = element.id;
                    "Claimed element has no usable geometry"
                );
                dropped += 1;
            }
        }
    }

    debug!(
        shape = K::SHAPE.name(),
        kept = result.total(),
        dropped = dropped;
        "Classified elements"
    );
    result
}
