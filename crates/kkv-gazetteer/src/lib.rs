//! Administrative boundary gazetteer.
//!
//! Loads a delimited village boundary table, flattens its four administrative
//! levels into one list of entries and indexes them by normalized name.

#![deny(unsafe_code)]

pub mod columns;
pub mod error;
pub mod hash;
pub mod index;
pub mod loader;
pub mod source;

pub use columns::{GazetteerColumns, LoadOptions};
pub use error::DataLoadError;
pub use index::{GazetteerIndex, GazetteerSummary, build_index, extract_entries};
pub use loader::{GAZETTEER_ENV_VAR, default_gazetteer_path, load_gazetteer};
pub use source::SourceTable;
