/// A zone type a hand-drawn polygon can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawAreaType {
    pub value: &'static str,
    pub label_key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

const fn area_type(
    value: &'static str,
    label_key: &'static str,
    name: &'static str,
    color: &'static str,
) -> DrawAreaType {
    DrawAreaType {
        value,
        label_key,
        name,
        color,
    }
}

pub const FALLBACK_AREA_TYPE: &str = "keep_free";

pub static DRAW_AREA_TYPES: &[DrawAreaType] = &[
    area_type("patient", "areas.types.patient", "Patient collection", "#7c3aed"),
    area_type("red", "areas.types.red", "Red (immediate)", "#dc2626"),
    area_type("yellow", "areas.types.yellow", "Yellow (delayed)", "#eab308"),
    area_type("green", "areas.types.green", "Green (minor)", "#16a34a"),
    area_type("black_blue", "areas.types.black_blue", "Black/Blue (expectant)", "#1e1b4b"),
    area_type("rescue", "areas.types.rescue", "Rescue", "#059669"),
    area_type("loading", "areas.types.loading", "Loading zone", "#0891b2"),
    area_type("damage", "areas.types.damage", "Damage", "#ea580c"),
    area_type("danger", "areas.types.danger", "Danger zone", "#b91c1c"),
    area_type("heli", "areas.types.heli", "Helicopter landing", "#db2777"),
    area_type("keep_free", "areas.types.keep_free", "Keep free", "#6b7280"),
];

pub fn find_area_type(value: &str) -> Option<&'static DrawAreaType> {
    DRAW_AREA_TYPES.iter().find(|area_type| area_type.value == value)
}

/// Unknown values resolve to the keep-free zone.
pub fn area_type_or_fallback(value: &str) -> &'static DrawAreaType {
    find_area_type(value)
        .or_else(|| find_area_type(FALLBACK_AREA_TYPE))
        .unwrap_or(&DRAW_AREA_TYPES[DRAW_AREA_TYPES.len() - 1])
}
