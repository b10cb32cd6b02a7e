pub mod category;
pub mod feature;
pub mod osm;

pub use self::category::{
    AreaKind, Category, CategoryKind, Classified, LineKind, NodeKind, Shape, TypeConfig,
};
pub use self::feature::{FeatureGeometry, GenericFeature};
pub use self::osm::{ElementRef, ElementType, OsmId, OverpassResponse, RawElement};

/// Everything one round pulls out of Overpass, bucketed by category.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundData {
    pub lines: Classified<LineKind>,
    pub nodes: Classified<NodeKind>,
    pub areas: Classified<AreaKind>,
}

impl Default for RoundData {
    fn default() -> Self {
        RoundData {
            lines: Classified::empty(LineKind::ALL),
            nodes: Classified::empty(NodeKind::ALL),
            areas: Classified::empty(AreaKind::ALL),
        }
    }
}

impl RoundData {
    pub fn total(&self) -> usize {
        self.lines.total() + self.nodes.total() + self.areas.total()
    }

    /// Looks a feature up by the category that claimed it.
    pub fn find(&self, category: Category, element: ElementRef) -> Option<&GenericFeature> {
        match category {
            Category::Line(kind) => self.lines.find(kind, element),
            Category::Node(kind) => self.nodes.find(kind, element),
            Category::Area(kind) => self.areas.find(kind, element),
        }
    }

    /// Lookup for layer hits, which only carry the numeric id.
    pub fn find_id(&self, category: Category, id: OsmId) -> Option<&GenericFeature> {
        match category {
            Category::Line(kind) => self.lines.find_id(kind, id),
            Category::Node(kind) => self.nodes.find_id(kind, id),
            Category::Area(kind) => self.areas.find_id(kind, id),
        }
    }

    pub fn features(&self, category: Category) -> &[GenericFeature] {
        match category {
            Category::Line(kind) => self.lines.get(kind),
            Category::Node(kind) => self.nodes.get(kind),
            Category::Area(kind) => self.areas.get(kind),
        }
    }
}
