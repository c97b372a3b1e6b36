// Candidate filtering: drops sightings inside the exclusion region and
// sightings whose entity id matches no enabled category.

use serde::{Deserialize, Serialize};

use super::model::CategorySelection;
use crate::core::model::Sighting;

/// Axis-aligned rectangle in world coordinates, inclusive on all four bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl ExclusionRegion {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

/// Puro Puro. Implings spawn here constantly, so sightings inside are never
/// alerted on regardless of category.
pub const PURO_PURO: ExclusionRegion = ExclusionRegion {
    x_min: 2552,
    x_max: 2626,
    y_min: 4285,
    y_max: 4353,
};

/// Pure filter pass over one feed snapshot. Preserves input order; an empty
/// selection yields no candidates independent of the region.
pub fn filter_candidates(
    sightings: &[Sighting],
    selection: &CategorySelection,
    region: &ExclusionRegion,
) -> Vec<Sighting> {
    if selection.is_empty() {
        return Vec::new();
    }
    let active_ids = selection.active_ids();
    sightings
        .iter()
        .filter(|s| !region.contains(s.x, s.y) && active_ids.contains(&s.entity_id))
        .cloned()
        .collect()
}
