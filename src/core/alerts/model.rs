// Alert model types: impling categories, the user's selection, and the
// annotated sighting an alert carries.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::core::model::Sighting;

/// Impling categories eligible to trigger alerts, plus `Unknown` for ids
/// outside every table (classification result only, never selectable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplingKind {
    Dragon,
    Lucky,
    Ninja,
    Magpie,
    Crystal,
    Unknown,
}

lazy_static! {
    /// Entity id tables per category. The tables are disjoint by
    /// construction; classification checks them in `selectable()` order as a
    /// deterministic tie-break should that ever change.
    static ref CATEGORY_IDS: HashMap<ImplingKind, HashSet<u32>> = {
        let mut table = HashMap::new();
        table.insert(ImplingKind::Dragon, [1644, 1654].into_iter().collect());
        table.insert(ImplingKind::Lucky, [7233].into_iter().collect());
        table.insert(ImplingKind::Ninja, [1643, 1653].into_iter().collect());
        table.insert(ImplingKind::Magpie, [1642, 1652].into_iter().collect());
        table.insert(ImplingKind::Crystal, (8741..=8757).collect());
        table
    };
    static ref NO_IDS: HashSet<u32> = HashSet::new();
}

impl ImplingKind {
    /// Categories the user can enable, in classification precedence order.
    pub fn selectable() -> &'static [ImplingKind] {
        &[
            Self::Dragon,
            Self::Lucky,
            Self::Ninja,
            Self::Magpie,
            Self::Crystal,
        ]
    }

    /// Entity ids belonging to this category.
    pub fn ids(self) -> &'static HashSet<u32> {
        CATEGORY_IDS.get(&self).unwrap_or(&NO_IDS)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Dragon => "Dragon",
            Self::Lucky => "Lucky",
            Self::Ninja => "Ninja",
            Self::Magpie => "Magpie",
            Self::Crystal => "Crystal",
            Self::Unknown => "Unknown",
        }
    }

    /// Assign a category to an entity id.
    pub fn classify(entity_id: u32) -> Self {
        for kind in Self::selectable() {
            if kind.ids().contains(&entity_id) {
                return *kind;
            }
        }
        Self::Unknown
    }
}

/// The set of categories currently armed for alerting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySelection {
    enabled: HashSet<ImplingKind>,
}

impl CategorySelection {
    pub fn is_enabled(&self, kind: ImplingKind) -> bool {
        self.enabled.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Flip a category on or off. Returns the new enabled state.
    /// `Unknown` is not selectable and is rejected by the caller before this.
    pub fn toggle(&mut self, kind: ImplingKind) -> bool {
        if self.enabled.remove(&kind) {
            false
        } else {
            self.enabled.insert(kind);
            true
        }
    }

    /// Union of the enabled categories' id tables.
    pub fn active_ids(&self) -> HashSet<u32> {
        self.enabled
            .iter()
            .flat_map(|kind| kind.ids().iter().copied())
            .collect()
    }
}

/// A sighting that triggered an alert, annotated at fire time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertedSighting {
    #[serde(flatten)]
    pub sighting: Sighting,
    pub kind: ImplingKind,
    /// Wall-clock time the alert fired (not the feed's insertion time).
    pub alerted_at: DateTime<Utc>,
    pub map_link: String,
}

impl AlertedSighting {
    pub fn annotate(sighting: &Sighting) -> Self {
        Self {
            kind: ImplingKind::classify(sighting.entity_id),
            alerted_at: Utc::now(),
            map_link: sighting.map_link(),
            sighting: sighting.clone(),
        }
    }
}

/// Alert lifecycle state. The machine cycles between the two for the
/// lifetime of the process; there is no terminal state.
#[derive(Debug, Clone, Default)]
pub enum AlertState {
    #[default]
    Idle,
    Active(AlertedSighting),
}

impl AlertState {
    pub fn active(&self) -> Option<&AlertedSighting> {
        match self {
            Self::Idle => None,
            Self::Active(alerted) => Some(alerted),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}
