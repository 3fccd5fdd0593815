#![deny(unsafe_code)]

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, info_span};

use crate::columns::LoadOptions;
use crate::error::DataLoadError;
use crate::hash::sha256_hex;
use crate::index::{GazetteerIndex, build_index};
use crate::source::SourceTable;

/// Environment variable naming the default gazetteer file.
pub const GAZETTEER_ENV_VAR: &str = "KKV_GAZETTEER";

/// Default gazetteer location.
///
/// Resolution order:
/// 1. `KKV_GAZETTEER` environment variable
/// 2. `data/LapakGIS_KelurahanDesa_2024.csv` relative to the working directory
pub fn default_gazetteer_path() -> PathBuf {
    if let Ok(path) = std::env::var(GAZETTEER_ENV_VAR) {
        return PathBuf::from(path);
    }
    PathBuf::from("data").join("LapakGIS_KelurahanDesa_2024.csv")
}

/// Reads a boundary file and builds its index.
///
/// The index carries the file path and the SHA-256 of its bytes so reports can
/// identify exactly which gazetteer a run used.
pub fn load_gazetteer(path: &Path, options: &LoadOptions) -> Result<GazetteerIndex, DataLoadError> {
    let span = info_span!("load_gazetteer", path = %path.display());
    let _guard = span.enter();
    let start = Instant::now();

    let bytes = std::fs::read(path).map_err(|source| DataLoadError::io(path, source))?;
    let fingerprint = sha256_hex(&bytes);
    let location = path.display().to_string();
    let table = SourceTable::from_reader(bytes.as_slice(), options.delimiter, &location)?;
    let index = build_index(&table, &options.columns).map_err(|error| match error {
        DataLoadError::Empty { .. } => DataLoadError::Empty {
            location: location.clone(),
        },
        other => other,
    })?;

    info!(
        rows = table.row_count(),
        entries = index.entry_count(),
        distinct_keys = index.len(),
        collisions = index.collisions(),
        duration_ms = start.elapsed().as_millis() as u64,
        "gazetteer loaded"
    );
    Ok(index.with_source(location, fingerprint))
}
