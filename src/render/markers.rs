use std::collections::{BTreeMap, HashSet};

use log::{debug, warn};

use super::surface::{MapSurface, MarkerHandle, MarkerSpec};
use crate::data::{CategoryKind, ElementRef, GenericFeature, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq)]
struct MarkerEntry {
    handle: MarkerHandle,
    kind: NodeKind,
    element: ElementRef,
}

/// `tree-n7` for node 7, `tree-w7` for way 7.
pub fn marker_key(kind: NodeKind, element: ElementRef) -> String {
    format!("{}-{}", kind.key(), element)
}

/// Point overlays keyed `<category>-<element>`. Overlays survive style
/// swaps, so every handle is tracked here until removed.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    entries: BTreeMap<String, MarkerEntry>,
}

impl MarkerRegistry {
    pub fn add<S: MapSurface>(
        &mut self,
        surface: &mut S,
        kind: NodeKind,
        nodes: &[GenericFeature],
    ) {
        let config = kind.config();
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in nodes {
            let Some(position) = node.anchor() else {
                continue;
            };
            let key = marker_key(kind, node.element_ref());
            if !seen.insert(key.clone()) {
                warn!(key = key.as_str(); "Duplicate marker key in one batch");
            }
            if let Some(previous) = self.entries.remove(&key) {
                surface.remove_marker(previous.handle);
            }
            let handle = surface.add_marker(MarkerSpec {
                position,
                color: config.color_for(node.tag(config.tag_key)).to_string(),
                title: node.tag("name").map(str::to_string),
            });
            self.entries.insert(
                key,
                MarkerEntry {
                    handle,
                    kind,
                    element: node.element_ref(),
                },
            );
        }
        debug!(category = kind.key(), count = nodes.len(); "Added markers");
    }

    pub fn remove_by_category<S: MapSurface>(&mut self, surface: &mut S, kind: NodeKind) {
        self.entries.retain(|_, entry| {
            if entry.kind == kind {
                surface.remove_marker(entry.handle);
                false
            } else {
                true
            }
        });
    }

    pub fn remove_all<S: MapSurface>(&mut self, surface: &mut S) {
        for entry in self.entries.values() {
            surface.remove_marker(entry.handle);
        }
        self.entries.clear();
    }

    /// The node a marker key stands for.
    pub fn resolve(&self, key: &str) -> Option<(NodeKind, ElementRef)> {
        self.entries.get(key).map(|entry| (entry.kind, entry.element))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
