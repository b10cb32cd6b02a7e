use std::{fmt, hash::Hash, str::FromStr};

use super::{
    feature::GenericFeature,
    osm::{ElementRef, OsmId, Tags},
};
use crate::errors::{Error, Result};

/// How features of a category are drawn: as a line layer, a marker, or a filled area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Line,
    Node,
    Area,
}

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Line => "line",
            Shape::Node => "node",
            Shape::Area => "area",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightField {
    pub key: &'static str,
    pub label_key: &'static str,
    pub color: Option<&'static str>,
}

const fn field(key: &'static str, label_key: &'static str) -> HighlightField {
    HighlightField {
        key,
        label_key,
        color: None,
    }
}

/// Tag filter and display style of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeConfig {
    pub tag_key: &'static str,
    /// `None` accepts any value of `tag_key`.
    pub tag_values: Option<&'static [&'static str]>,
    pub colors: &'static [(&'static str, &'static str)],
    pub default_color: &'static str,
    pub widths: &'static [(&'static str, f64)],
    pub default_width: f64,
    pub highlight_fields: &'static [HighlightField],
}

impl TypeConfig {
    pub fn matches(&self, tags: &Tags) -> bool {
        match tags.get(self.tag_key) {
            Some(value) => match self.tag_values {
                Some(values) => values.contains(&value.as_str()),
                None => true,
            },
            None => false,
        }
    }

    pub fn color_for(&self, value: Option<&str>) -> &'static str {
        value
            .and_then(|value| self.colors.iter().find(|(key, _)| *key == value))
            .map(|(_, color)| *color)
            .unwrap_or(self.default_color)
    }

    pub fn width_for(&self, value: Option<&str>) -> f64 {
        value
            .and_then(|value| self.widths.iter().find(|(key, _)| *key == value))
            .map(|(_, width)| *width)
            .unwrap_or(self.default_width)
    }
}

/// A closed set of categories sharing one shape. Declaration order in `ALL`
/// is the classification precedence.
pub trait CategoryKind: Copy + Eq + Hash + fmt::Debug + 'static {
    const SHAPE: Shape;
    const ALL: &'static [Self];

    fn key(self) -> &'static str;
    fn config(self) -> &'static TypeConfig;
    fn category(self) -> Category;

    fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| Error::unsupported(Self::SHAPE.name(), key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Railway,
    Power,
    Highway,
    Waterway,
    Pipeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Tree,
    PowerPole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Landuse,
}

static RAILWAY: TypeConfig = TypeConfig {
    tag_key: "railway",
    tag_values: Some(&["rail", "light_rail", "subway", "tram"]),
    colors: &[
        ("rail", "#16a34a"),
        ("light_rail", "#16a34a"),
        ("subway", "#16a34a"),
        ("tram", "#16a34a"),
    ],
    default_color: "#16a34a",
    widths: &[("rail", 3.0), ("light_rail", 2.0), ("subway", 2.0)],
    default_width: 1.0,
    highlight_fields: &[
        field("railway", "type"),
        field("service", "service"),
        field("electrified", "electrified"),
        field("maxspeed", "maxspeed"),
    ],
};

static POWER_LINE: TypeConfig = TypeConfig {
    tag_key: "power",
    tag_values: Some(&["line", "cable", "minor_line"]),
    colors: &[("line", "#dc2626"), ("cable", "#dc2626"), ("minor_line", "#dc2626")],
    default_color: "#dc2626",
    widths: &[("line", 4.0), ("cable", 2.0), ("minor_line", 2.0)],
    default_width: 2.0,
    highlight_fields: &[field("power", "type"), field("voltage", "voltage")],
};

static HIGHWAY: TypeConfig = TypeConfig {
    tag_key: "highway",
    tag_values: Some(&[
        "motorway",
        "trunk",
        "primary",
        "secondary",
        "tertiary",
        "track",
        "cycleway",
        "residential",
    ]),
    colors: &[
        ("motorway", "#f59e42"),
        ("trunk", "#f59e42"),
        ("primary", "#fbbf24"),
        ("secondary", "#f59e42"),
        ("tertiary", "#fbbf24"),
    ],
    default_color: "#fbbf24",
    widths: &[
        ("motorway", 8.0),
        ("trunk", 8.0),
        ("primary", 8.0),
        ("secondary", 5.0),
        ("tertiary", 5.0),
    ],
    default_width: 5.0,
    highlight_fields: &[field("highway", "type"), field("maxspeed", "maxspeed")],
};

static WATERWAY: TypeConfig = TypeConfig {
    tag_key: "waterway",
    tag_values: Some(&["river", "stream", "canal", "drain"]),
    colors: &[
        ("river", "#38bdf8"),
        ("stream", "#0ea5e9"),
        ("canal", "#06b6d4"),
        ("drain", "#0ea5e9"),
    ],
    default_color: "#38bdf8",
    widths: &[("river", 3.0), ("stream", 2.0), ("canal", 2.0), ("drain", 1.0)],
    default_width: 1.0,
    highlight_fields: &[field("waterway", "type"), field("width", "width")],
};

static PIPELINE: TypeConfig = TypeConfig {
    tag_key: "man_made",
    tag_values: Some(&["pipeline"]),
    colors: &[("pipeline", "#747474")],
    default_color: "#747474",
    widths: &[("pipeline", 2.0)],
    default_width: 2.0,
    highlight_fields: &[field("man_made", "type"), field("substance", "substance")],
};

static TREE: TypeConfig = TypeConfig {
    tag_key: "natural",
    tag_values: Some(&["tree"]),
    colors: &[("tree", "#16a34a")],
    default_color: "#16a34a",
    widths: &[],
    default_width: 0.0,
    highlight_fields: &[
        field("natural", "type"),
        field("species", "species"),
        field("height", "height"),
    ],
};

static POWER_POLE: TypeConfig = TypeConfig {
    tag_key: "power",
    tag_values: Some(&["pole", "tower"]),
    colors: &[("pole", "#dc2626"), ("tower", "#991b1b")],
    default_color: "#dc2626",
    widths: &[],
    default_width: 0.0,
    highlight_fields: &[
        field("power", "type"),
        field("operator", "operator"),
        field("line", "line"),
    ],
};

static LANDUSE: TypeConfig = TypeConfig {
    tag_key: "landuse",
    tag_values: Some(&[
        "farmland",
        "forest",
        "meadow",
        "grass",
        "village_green",
        "residential",
        "commercial",
        "industrial",
        "retail",
        "allotments",
        "cemetery",
        "orchard",
    ]),
    colors: &[
        ("farmland", "#8B4513"),
        ("forest", "#228B22"),
        ("meadow", "#90EE90"),
        ("grass", "#7CFC00"),
        ("village_green", "#32CD32"),
        ("residential", "#ADD8E6"),
        ("commercial", "#FFD700"),
        ("industrial", "#A9A9A9"),
        ("retail", "#FF6347"),
        ("allotments", "#98FB98"),
        ("cemetery", "#D3D3D3"),
        ("orchard", "#FFDEAD"),
    ],
    default_color: "#16a34a",
    widths: &[],
    default_width: 2.0,
    highlight_fields: &[
        field("landuse", "type"),
        field("name", "name"),
        field("operator", "operator"),
    ],
};

impl CategoryKind for LineKind {
    const SHAPE: Shape = Shape::Line;
    const ALL: &'static [Self] = &[
        LineKind::Railway,
        LineKind::Power,
        LineKind::Highway,
        LineKind::Waterway,
        LineKind::Pipeline,
    ];

    fn key(self) -> &'static str {
        match self {
            LineKind::Railway => "railway",
            LineKind::Power => "power",
            LineKind::Highway => "highway",
            LineKind::Waterway => "waterway",
            LineKind::Pipeline => "pipeline",
        }
    }

    fn config(self) -> &'static TypeConfig {
        match self {
            LineKind::Railway => &RAILWAY,
            LineKind::Power => &POWER_LINE,
            LineKind::Highway => &HIGHWAY,
            LineKind::Waterway => &WATERWAY,
            LineKind::Pipeline => &PIPELINE,
        }
    }

    fn category(self) -> Category {
        Category::Line(self)
    }
}

impl CategoryKind for NodeKind {
    const SHAPE: Shape = Shape::Node;
    const ALL: &'static [Self] = &[NodeKind::Tree, NodeKind::PowerPole];

    fn key(self) -> &'static str {
        match self {
            NodeKind::Tree => "tree",
            NodeKind::PowerPole => "power_pole",
        }
    }

    fn config(self) -> &'static TypeConfig {
        match self {
            NodeKind::Tree => &TREE,
            NodeKind::PowerPole => &POWER_POLE,
        }
    }

    fn category(self) -> Category {
        Category::Node(self)
    }
}

impl CategoryKind for AreaKind {
    const SHAPE: Shape = Shape::Area;
    const ALL: &'static [Self] = &[AreaKind::Landuse];

    fn key(self) -> &'static str {
        match self {
            AreaKind::Landuse => "landuse",
        }
    }

    fn config(self) -> &'static TypeConfig {
        match self {
            AreaKind::Landuse => &LANDUSE,
        }
    }

    fn category(self) -> Category {
        Category::Area(self)
    }
}

macro_rules! from_str_via_key {
    ($($kind:ty),*) => {
        $(
            impl FromStr for $kind {
                type Err = Error;

                fn from_str(s: &str) -> Result<Self> {
                    <$kind as CategoryKind>::from_key(s)
                }
            }
        )*
    };
}

from_str_via_key!(LineKind, NodeKind, AreaKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Line(LineKind),
    Node(NodeKind),
    Area(AreaKind),
}

impl Category {
    pub fn parse(shape: Shape, key: &str) -> Result<Category> {
        Ok(match shape {
            Shape::Line => Category::Line(key.parse()?),
            Shape::Node => Category::Node(key.parse()?),
            Shape::Area => Category::Area(key.parse()?),
        })
    }

    pub fn shape(self) -> Shape {
        match self {
            Category::Line(_) => Shape::Line,
            Category::Node(_) => Shape::Node,
            Category::Area(_) => Shape::Area,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Category::Line(kind) => kind.key(),
            Category::Node(kind) => kind.key(),
            Category::Area(kind) => kind.key(),
        }
    }

    pub fn config(self) -> &'static TypeConfig {
        match self {
            Category::Line(kind) => kind.config(),
            Category::Node(kind) => kind.config(),
            Category::Area(kind) => kind.config(),
        }
    }

    /// Every category, areas first, then lines, then nodes: the draw order.
    pub fn all() -> impl Iterator<Item = Category> {
        AreaKind::ALL
            .iter()
            .map(|kind| kind.category())
            .chain(LineKind::ALL.iter().map(|kind| kind.category()))
            .chain(NodeKind::ALL.iter().map(|kind| kind.category()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.shape().name(), self.key())
    }
}

/// One feature vector per enabled category, in precedence order. Enabled
/// categories are always present, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<K> {
    buckets: Vec<(K, Vec<GenericFeature>)>,
}

impl<K: CategoryKind> Classified<K> {
    pub fn empty(kinds: &[K]) -> Self {
        let mut buckets: Vec<(K, Vec<GenericFeature>)> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !buckets.iter().any(|(existing, _)| existing == kind) {
                buckets.push((*kind, Vec::new()));
            }
        }
        Classified { buckets }
    }

    pub fn kinds(&self) -> impl Iterator<Item = K> + '_ {
        self.buckets.iter().map(|(kind, _)| *kind)
    }

    pub fn is_enabled(&self, kind: K) -> bool {
        self.buckets.iter().any(|(existing, _)| *existing == kind)
    }

    pub fn get(&self, kind: K) -> &[GenericFeature] {
        self.buckets
            .iter()
            .find(|(existing, _)| *existing == kind)
            .map(|(_, features)| features.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &[GenericFeature])> + '_ {
        self.buckets.iter().map(|(kind, features)| (*kind, features.as_slice()))
    }

    pub fn find(&self, kind: K, element: ElementRef) -> Option<&GenericFeature> {
        self.get(kind).iter().find(|feature| feature.element_ref() == element)
    }

    /// First feature with this id, whatever its element type.
    pub fn find_id(&self, kind: K, id: OsmId) -> Option<&GenericFeature> {
        self.get(kind).iter().find(|feature| feature.id == id)
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, features)| features.len()).sum()
    }

    pub(crate) fn push(&mut self, kind: K, feature: GenericFeature) {
        let bucket = self.buckets.iter_mut().find(|(existing, _)| *existing == kind);
        if let Some((_, features)) = bucket {
            features.push(feature);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn matches_key_and_allowed_values() {
        let railway = LineKind::Railway.config();
        assert!(railway.matches(&tags(&[("railway", "rail")])));
        assert!(!railway.matches(&tags(&[("railway", "abandoned")])));
        assert!(!railway.matches(&tags(&[("highway", "primary")])));
    }

    #[test]
    fn missing_value_list_accepts_any_value() {
        let any_amenity = TypeConfig {
            tag_key: "amenity",
            tag_values: None,
            colors: &[],
            default_color: "#000000",
            widths: &[],
            default_width: 1.0,
            highlight_fields: &[],
        };
        assert!(any_amenity.matches(&tags(&[("amenity", "hospital")])));
        assert!(!any_amenity.matches(&tags(&[("natural", "tree")])));
    }

    #[test]
    fn style_falls_back_to_default() {
        let highway = LineKind::Highway.config();
        assert_eq!(highway.color_for(Some("motorway")), "#f59e42");
        assert_eq!(highway.color_for(Some("track")), "#fbbf24");
        assert_eq!(highway.color_for(None), "#fbbf24");
        assert_eq!(highway.width_for(Some("trunk")), 8.0);
        assert_eq!(highway.width_for(Some("cycleway")), 5.0);
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert_eq!(
            Category::parse(Shape::Line, "railway").unwrap(),
            Category::Line(LineKind::Railway)
        );
        assert_eq!(
            Category::parse(Shape::Node, "power_pole").unwrap(),
            Category::Node(NodeKind::PowerPole)
        );
        let err = Category::parse(Shape::Line, "canal").unwrap_err();
        assert_eq!(err.message, "Unsupported line type: canal");
        assert!("tree".parse::<AreaKind>().is_err());
    }

    #[test]
    fn draw_order_is_areas_lines_nodes() {
        let shapes: Vec<Shape> = Category::all().map(Category::shape).collect();
        let first_line = shapes.iter().position(|s| *s == Shape::Line).unwrap();
        let first_node = shapes.iter().position(|s| *s == Shape::Node).unwrap();
        assert_eq!(shapes[0], Shape::Area);
        assert!(shapes[..first_line].iter().all(|s| *s == Shape::Area));
        assert!(shapes[first_line..first_node].iter().all(|s| *s == Shape::Line));
        assert!(shapes[first_node..].iter().all(|s| *s == Shape::Node));
    }

    #[test]
    fn classified_is_fully_initialised() {
        let classified =
            Classified::empty(&[LineKind::Highway, LineKind::Railway, LineKind::Highway]);
        let kinds: Vec<LineKind> = classified.kinds().collect();
        assert_eq!(kinds, vec![LineKind::Highway, LineKind::Railway]);
        assert!(classified.get(LineKind::Railway).is_empty());
        assert!(!classified.is_enabled(LineKind::Power));
        assert_eq!(classified.total(), 0);
    }
}
