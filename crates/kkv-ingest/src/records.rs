//! Typed registry records from a raw table.

use std::collections::BTreeMap;

use kkv_model::{RecordField, RegistryRecord};

use crate::csv_table::RegistryTable;
use crate::error::{IngestError, Result};

/// Column name per record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordColumns {
    columns: BTreeMap<RecordField, String>,
}

impl Default for RecordColumns {
    fn default() -> Self {
        Self {
            columns: RecordField::ALL
                .iter()
                .map(|field| (*field, field.default_column().to_string()))
                .collect(),
        }
    }
}

impl RecordColumns {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_column(mut self, field: RecordField, column: impl Into<String>) -> Self {
        self.columns.insert(field, column.into());
        self
    }

    pub fn column(&self, field: RecordField) -> &str {
        self.columns
            .get(&field)
            .map_or_else(|| field.default_column(), String::as_str)
    }
}

/// Fields required for full record validation.
pub const ALL_FIELDS: &[RecordField] = &RecordField::ALL;

/// Fields required for place-only reconciliation.
pub const PLACE_ONLY: &[RecordField] = &[RecordField::PlaceOfBirth];

/// Checks that every required column exists, listing all that do not.
pub fn check_input_shape(
    table: &RegistryTable,
    columns: &RecordColumns,
    required: &[RecordField],
) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .map(|field| columns.column(*field))
        .filter(|column| !table.has_column(column))
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::InputShape { missing })
    }
}

/// Converts table rows into records. Optional fields whose column is absent
/// stay `None`.
pub fn extract_records(
    table: &RegistryTable,
    columns: &RecordColumns,
    required: &[RecordField],
) -> Result<Vec<RegistryRecord>> {
    check_input_shape(table, columns, required)?;
    let indices: Vec<(RecordField, usize)> = RecordField::ALL
        .iter()
        .filter_map(|field| {
            table
                .column_index(columns.column(*field))
                .map(|idx| (*field, idx))
        })
        .collect();
    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let mut record = RegistryRecord::new(row_idx);
            for (field, idx) in &indices {
                record.set(*field, row.get(*idx).cloned());
            }
            record
        })
        .collect();
    Ok(records)
}
