//! Flattened, immutable lookup over all administrative levels.

use std::collections::{BTreeMap, HashSet};

use kkv_model::{AdminLevel, GazetteerEntry, IndexedPlace};
use kkv_normalization::normalize_place_str;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::columns::GazetteerColumns;
use crate::error::DataLoadError;
use crate::source::SourceTable;

/// Lookup from normalized place key to canonical name and level.
///
/// Built once and shared by reference. Keys are unique; when several entries
/// normalize to the same key the one added last wins, so a province shadows a
/// village of the same name.
#[derive(Debug, Clone, Default)]
pub struct GazetteerIndex {
    lookup: BTreeMap<String, IndexedPlace>,
    candidates: Vec<String>,
    entry_count: usize,
    collisions: usize,
    source: Option<String>,
    fingerprint: Option<String>,
}

/// Diagnostic snapshot of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteerSummary {
    pub source: Option<String>,
    pub fingerprint: Option<String>,
    /// Entries before collapsing duplicate keys.
    pub entries: usize,
    pub distinct_keys: usize,
    /// Entries that overwrote an earlier entry with the same key.
    pub collisions: usize,
    /// Distinct keys per level after collapsing.
    pub levels: BTreeMap<AdminLevel, usize>,
}

impl GazetteerIndex {
    /// Builds the lookup from entries in concatenation order.
    pub fn from_entries(entries: Vec<GazetteerEntry>) -> Self {
        let entry_count = entries.len();
        let mut collisions = 0;
        let mut lookup = BTreeMap::new();
        for entry in entries {
            let key = entry.normalized_name.clone();
            if lookup.insert(key, IndexedPlace::from(entry)).is_some() {
                collisions += 1;
            }
        }
        let candidates = lookup.keys().cloned().collect();
        Self {
            lookup,
            candidates,
            entry_count,
            collisions,
            source: None,
            fingerprint: None,
        }
    }

    /// Attaches the source label and content fingerprint.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&IndexedPlace> {
        self.lookup.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    /// All keys in sorted order. Approximate matching walks this slice.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn summary(&self) -> GazetteerSummary {
        let mut levels: BTreeMap<AdminLevel, usize> =
            AdminLevel::ALL.iter().map(|level| (*level, 0)).collect();
        for place in self.lookup.values() {
            *levels.entry(place.level).or_default() += 1;
        }
        GazetteerSummary {
            source: self.source.clone(),
            fingerprint: self.fingerprint.clone(),
            entries: self.entry_count,
            distinct_keys: self.lookup.len(),
            collisions: self.collisions,
            levels,
        }
    }
}

/// Flattens a boundary table into entries: villages, then districts,
/// regencies and provinces.
///
/// Every missing name column is reported at once. The village code column is
/// optional; when present, rows without a code are dropped.
pub fn extract_entries(
    table: &SourceTable,
    columns: &GazetteerColumns,
) -> Result<Vec<GazetteerEntry>, DataLoadError> {
    let mut missing = Vec::new();
    let mut name_indices = Vec::with_capacity(AdminLevel::ALL.len());
    for level in AdminLevel::ALL {
        let name = columns.name_column(level);
        match table.column_index(name) {
            Some(idx) => name_indices.push((level, idx)),
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns { columns: missing });
    }
    let code_index = table.column_index(&columns.village_code);

    let mut entries = Vec::new();
    for (level, name_idx) in name_indices {
        let code_idx = match level {
            AdminLevel::Village => code_index,
            _ => None,
        };
        let before = entries.len();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        for row in 0..table.row_count() {
            let name = table.cell(row, name_idx);
            if name.is_empty() {
                continue;
            }
            // Above village level the name doubles as the code.
            let code = code_idx.map_or(name, |idx| table.cell(row, idx));
            if code.is_empty() || !seen.insert((code, name)) {
                continue;
            }
            let normalized_name = normalize_place_str(name);
            if normalized_name.is_empty() {
                continue;
            }
            entries.push(GazetteerEntry {
                canonical_name: name.to_string(),
                normalized_name,
                level,
            });
        }
        debug!(level = %level, entries = entries.len() - before, "extracted gazetteer level");
    }
    Ok(entries)
}

/// Builds an index from a boundary table. Fails when no entry survives.
pub fn build_index(
    table: &SourceTable,
    columns: &GazetteerColumns,
) -> Result<GazetteerIndex, DataLoadError> {
    let entries = extract_entries(table, columns)?;
    if entries.is_empty() {
        return Err(DataLoadError::Empty {
            location: "source table".to_string(),
        });
    }
    Ok(GazetteerIndex::from_entries(entries))
}
