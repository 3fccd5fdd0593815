use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};

/// A registry extract as read from disk: trimmed headers and cells, every row
/// padded or cut to the header width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RegistryTable {
    /// Index of a column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = normalize_header(name);
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(&name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of one column, `None` for empty cells.
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).filter(|v| !v.is_empty()))
                .collect(),
        )
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Guesses the delimiter from the header line: the most frequent of `,`,
/// `;`, tab and `|`, falling back to a comma.
pub fn sniff_delimiter(sample: &str) -> u8 {
    let header = sample.lines().next().unwrap_or("");
    [b',', b';', b'\t', b'|']
        .into_iter()
        .map(|delimiter| {
            let count = header.bytes().filter(|byte| *byte == delimiter).count();
            (delimiter, count)
        })
        .fold((b',', 0), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        })
        .0
}

/// Reads a registry extract. The first non-blank row is the header.
///
/// With `delimiter` unset the delimiter is sniffed from the header line.
pub fn read_registry_table(path: &Path, delimiter: Option<u8>) -> Result<RegistryTable> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&String::from_utf8_lossy(&bytes)));
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes.as_slice());

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|error| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    let mut raw_rows = raw_rows.into_iter();
    let Some(header_row) = raw_rows.next() else {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    };
    let headers: Vec<String> = header_row.iter().map(|value| normalize_header(value)).collect();
    let rows: Vec<Vec<String>> = raw_rows
        .map(|mut row| {
            row.resize(headers.len(), String::new());
            row
        })
        .collect();
    debug!(
        path = %path.display(),
        delimiter = %char::from(delimiter).escape_default(),
        columns = headers.len(),
        rows = rows.len(),
        "read registry table"
    );
    Ok(RegistryTable { headers, rows })
}
