#![deny(unsafe_code)]

use std::path::PathBuf;

/// Failure to build a gazetteer index. Always fatal: no partial index is produced.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("failed to read gazetteer {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse gazetteer CSV {location}: {message}")]
    Csv { location: String, message: String },

    #[error("gazetteer is missing required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("gazetteer {location} yielded no entries")]
    Empty { location: String },
}

impl DataLoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(location: &str, error: &csv::Error) -> Self {
        Self::Csv {
            location: location.to_string(),
            message: error.to_string(),
        }
    }
}
