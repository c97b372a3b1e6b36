use std::fmt;

use serde::{Deserialize, Serialize};

/// One reported observation of an impling at a world coordinate and time.
///
/// Field renames follow the wire format of the sightings feed. A sighting is
/// immutable once received; the alert engine annotates a copy when it fires,
/// never the feed record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sighting {
    #[serde(rename = "npcid")]
    pub entity_id: u32,
    #[serde(rename = "xcoord")]
    pub x: i32,
    #[serde(rename = "ycoord")]
    pub y: i32,
    pub world: World,
    /// Source-reported insertion timestamp, carried verbatim. It is part of
    /// the dedupe key, so it must never be reformatted.
    #[serde(rename = "insertedtime")]
    pub observed_at: String,
}

impl Sighting {
    /// Identity key for dedupe purposes. Two sightings with the same key are
    /// the same event, even when fetched in different polling cycles.
    pub fn key(&self) -> SightingKey {
        SightingKey {
            observed_at: self.observed_at.clone(),
            x: self.x,
            y: self.y,
        }
    }

    /// URL into the external map viewer, centred and marked on this sighting.
    pub fn map_link(&self) -> String {
        format!(
            "https://jackdallas.github.io/osrs-map/?centreX={x}&centreY={y}&centreZ=0&zoom=9&markerX={x}&markerY={y}",
            x = self.x,
            y = self.y
        )
    }
}

/// Server instance identifier. The feed reports this as a number for normal
/// worlds but occasionally as a string label, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum World {
    Id(u32),
    Name(String),
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Composite identity of a sighting occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SightingKey {
    observed_at: String,
    x: i32,
    y: i32,
}

/// Shape of the feed endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<Sighting>,
}
