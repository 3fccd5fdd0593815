#![deny(unsafe_code)]

use std::io::Read;

use csv::ReaderBuilder;

use crate::error::DataLoadError;

/// Raw boundary table: trimmed headers and trimmed, padded rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SourceTable {
    /// Reads a delimited table with a header row.
    ///
    /// `location` only labels errors. Fully blank rows are skipped and short
    /// rows are padded to the header width.
    pub fn from_reader<R: Read>(
        reader: R,
        delimiter: u8,
        location: &str,
    ) -> Result<Self, DataLoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = reader
            .headers()
            .map_err(|error| DataLoadError::csv(location, &error))?
            .iter()
            .map(normalize_header)
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|error| DataLoadError::csv(location, &error))?;
            let mut row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            if row.iter().all(String::is_empty) {
                continue;
            }
            if row.len() < headers.len() {
                row.resize(headers.len(), String::new());
            }
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }

    /// Builds a table from in-memory rows. Used by tests and callers that
    /// already hold parsed data.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| normalize_header(h)).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| v.trim().to_string()).collect())
                .collect(),
        }
    }

    /// Index of a column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name.trim()))
    }

    /// Cell value, empty when the row is shorter than the column index.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map_or("", String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}
