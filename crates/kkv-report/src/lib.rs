//! Reporting for validation runs: summary statistics, the place report and
//! CSV/JSON exports.

#![deny(unsafe_code)]

pub mod error;
pub mod export;
pub mod place_report;
pub mod report;
pub mod summary;

pub use error::ReportError;
pub use export::{
    ExportPaths, ExportSummary, INVALID_FILE, PLACE_COLUMNS, RECORD_COLUMNS, REPORT_FILE,
    RowFilter, VALIDATED_FILE, export_places, export_records, write_json_report,
    write_places_csv, write_records_csv,
};
pub use place_report::{
    CONFIDENCE_BINS, ConfidenceBin, Correction, InvalidSample, LevelShare, MAX_CORRECTIONS,
    MAX_INVALID_SAMPLES, PlaceReport,
};
pub use report::ValidationReport;
pub use summary::{FieldSummary, ValidationSummary, percent};
