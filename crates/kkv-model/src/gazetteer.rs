use serde::{Deserialize, Serialize};

use crate::enums::AdminLevel;

/// One administrative place from the boundary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    /// Display form as published by the source.
    pub canonical_name: String,
    /// Normalized form used as the lookup key. Not unique across entries.
    pub normalized_name: String,
    pub level: AdminLevel,
}

/// What a normalized key resolves to in the gazetteer lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedPlace {
    pub canonical_name: String,
    pub level: AdminLevel,
}

impl From<GazetteerEntry> for IndexedPlace {
    fn from(entry: GazetteerEntry) -> Self {
        Self {
            canonical_name: entry.canonical_name,
            level: entry.level,
        }
    }
}
