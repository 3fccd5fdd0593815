//! Registry extract ingestion.
//!
//! Reads delimited population-registry extracts into a [`RegistryTable`] and
//! turns the rows into typed [`RegistryRecord`](kkv_model::RegistryRecord)s
//! once the required columns have been checked.

pub mod csv_table;
pub mod error;
pub mod records;

pub use csv_table::{RegistryTable, read_registry_table, sniff_delimiter};
pub use error::{IngestError, Result};
pub use records::{ALL_FIELDS, PLACE_ONLY, RecordColumns, check_input_shape, extract_records};
