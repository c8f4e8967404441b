use std::collections::HashSet;

use crate::knowledge::{Link, NodeCategory};

pub const LINK_OPACITY_BASELINE: f32 = 0.4;
pub const LINK_OPACITY_INCIDENT: f32 = 0.8;
pub const LINK_OPACITY_DIMMED: f32 = 0.1;

pub fn node_radius(category: NodeCategory) -> f32 {
    match category {
        NodeCategory::Concept => 14.0,
        NodeCategory::Topic => 12.0,
        NodeCategory::Question | NodeCategory::Answer => 10.0,
    }
}

pub fn hovered_node_radius(category: NodeCategory) -> f32 {
    node_radius(category) + 4.0
}

/// Hover and selection, kept apart from layout state so emphasis never
/// feeds back into the physics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlight {
    pub hovered: Option<String>,
    pub selected: Option<String>,
}

impl Highlight {
    pub fn set_hovered(&mut self, id: Option<&str>) -> bool {
        if self.hovered.as_deref() == id {
            return false;
        }
        self.hovered = id.map(str::to_owned);
        true
    }

    pub fn set_selected(&mut self, id: Option<&str>) -> bool {
        if self.selected.as_deref() == id {
            return false;
        }
        self.selected = id.map(str::to_owned);
        true
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered.as_deref() == Some(id)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Drops a hover that points at a node no longer drawn. Selection is
    /// left alone; only a new selection or a clear replaces it.
    pub fn retain_hovered(&mut self, shown: impl Fn(&str) -> bool) {
        if self.hovered.as_deref().is_some_and(|id| !shown(id)) {
            self.hovered = None;
        }
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.selected = None;
    }

    /// Stroke opacity per link, in link order.
    pub fn link_emphasis(&self, links: &[Link]) -> Vec<f32> {
        links
            .iter()
            .map(|link| match self.hovered.as_deref() {
                Some(id) if link.touches(id) => LINK_OPACITY_INCIDENT,
                Some(_) => LINK_OPACITY_DIMMED,
                None => LINK_OPACITY_BASELINE,
            })
            .collect()
    }

    /// The hovered node plus everything one link away from it.
    pub fn hovered_neighbourhood<'a>(&'a self, links: &'a [Link]) -> HashSet<&'a str> {
        let mut related = HashSet::new();
        let Some(hovered) = self.hovered.as_deref() else {
            return related;
        };

        related.insert(hovered);
        for link in links {
            if link.source == hovered {
                related.insert(link.target.as_str());
            } else if link.target == hovered {
                related.insert(link.source.as_str());
            }
        }
        related
    }
}
