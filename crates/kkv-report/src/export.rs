//! CSV and JSON exports.
//!
//! Augmented CSVs repeat every source column unchanged and append the result
//! columns, so a reviewer can open them next to the original extract.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use kkv_ingest::RegistryTable;
use kkv_model::{PlaceValidation, RecordField, ValidatedRecord};
use tracing::info;

use crate::error::ReportError;
use crate::report::ValidationReport;

/// Result columns appended for place-only runs.
pub const PLACE_COLUMNS: [&str; 6] = [
    "valid_tempat_lahir",
    "place_normalized",
    "place_corrected",
    "place_level",
    "place_confidence",
    "place_match_kind",
];

/// Result columns appended for full validation runs.
pub const RECORD_COLUMNS: [&str; 13] = [
    "valid_kk_no",
    "valid_nik",
    "valid_custname",
    "valid_jenis_kelamin",
    "valid_tempat_lahir",
    "valid_tanggal_lahir",
    "place_normalized",
    "place_corrected",
    "place_level",
    "place_confidence",
    "place_match_kind",
    "all_valid",
    "validation_notes",
];

pub const VALIDATED_FILE: &str = "validated.csv";
pub const INVALID_FILE: &str = "invalid.csv";
pub const REPORT_FILE: &str = "report.json";

/// Which rows an export keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter<'f> {
    All,
    /// Rows failing any of the fields; any failure when the slice is empty.
    Invalid(&'f [RecordField]),
}

impl RowFilter<'_> {
    fn keeps(&self, record: &ValidatedRecord) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::Invalid([]) => !record.all_valid(),
            RowFilter::Invalid(fields) => fields.iter().any(|field| !record.field_valid(*field)),
        }
    }
}

/// Output file locations inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub validated: PathBuf,
    pub invalid: PathBuf,
    pub report: PathBuf,
}

impl ExportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            validated: dir.join(VALIDATED_FILE),
            invalid: dir.join(INVALID_FILE),
            report: dir.join(REPORT_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub paths: ExportPaths,
    pub validated_rows: usize,
    pub invalid_rows: usize,
}

fn bool_cell(value: bool) -> String {
    value.to_string()
}

fn place_cells(place: &PlaceValidation) -> [String; 5] {
    [
        place.place_normalized.clone().unwrap_or_default(),
        place.corrected_name.clone().unwrap_or_default(),
        place
            .admin_level
            .map(|level| level.as_str().to_string())
            .unwrap_or_default(),
        format!("{:.2}", place.confidence_score),
        place.match_kind.as_str().to_string(),
    ]
}

fn source_cells(table: &RegistryTable, row: usize) -> Vec<String> {
    let mut cells = table.rows.get(row).cloned().unwrap_or_default();
    cells.resize(table.headers.len(), String::new());
    cells
}

fn header_row(table: &RegistryTable, result_columns: &[&str]) -> Vec<String> {
    table
        .headers
        .iter()
        .cloned()
        .chain(result_columns.iter().map(|c| (*c).to_string()))
        .collect()
}

/// Writes validated records with their source columns. Returns rows written.
pub fn write_records_csv<W: Write>(
    writer: W,
    table: &RegistryTable,
    records: &[ValidatedRecord],
    filter: RowFilter<'_>,
) -> Result<usize, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);
    writer.write_record(header_row(table, &RECORD_COLUMNS))?;
    let mut written = 0;
    for record in records.iter().filter(|record| filter.keeps(record)) {
        let mut row = source_cells(table, record.index);
        row.extend(
            RecordField::ALL
                .iter()
                .map(|field| bool_cell(record.field_valid(*field))),
        );
        row.extend(place_cells(&record.place));
        row.push(bool_cell(record.all_valid()));
        row.push(record.notes().unwrap_or_default());
        writer.write_record(&row)?;
        written += 1;
    }
    writer.flush().map_err(|error| ReportError::Csv {
        message: error.to_string(),
    })?;
    Ok(written)
}

/// Writes place results with their source columns. `places[i]` belongs to row `i`.
pub fn write_places_csv<W: Write>(
    writer: W,
    table: &RegistryTable,
    places: &[PlaceValidation],
    invalid_only: bool,
) -> Result<usize, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);
    writer.write_record(header_row(table, &PLACE_COLUMNS))?;
    let mut written = 0;
    for (row_idx, place) in places.iter().enumerate() {
        if invalid_only && place.is_valid {
            continue;
        }
        let mut row = source_cells(table, row_idx);
        row.push(bool_cell(place.is_valid));
        row.extend(place_cells(place));
        writer.write_record(&row)?;
        written += 1;
    }
    writer.flush().map_err(|error| ReportError::Csv {
        message: error.to_string(),
    })?;
    Ok(written)
}

pub fn write_json_report<W: Write>(
    mut writer: W,
    report: &ValidationReport,
) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|error| ReportError::Json {
            message: error.to_string(),
        })
}

fn create(path: &Path) -> Result<BufWriter<File>, ReportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| ReportError::io(path, source))
}

fn prepare_dir(dir: &Path) -> Result<ExportPaths, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::io(dir, source))?;
    Ok(ExportPaths::in_dir(dir))
}

/// Writes `validated.csv`, `invalid.csv` and `report.json` for a full run.
///
/// `failed_fields` narrows `invalid.csv` to rows failing any of those fields.
pub fn export_records(
    dir: &Path,
    table: &RegistryTable,
    records: &[ValidatedRecord],
    failed_fields: &[RecordField],
    report: &ValidationReport,
) -> Result<ExportSummary, ReportError> {
    let paths = prepare_dir(dir)?;
    let validated_rows = write_records_csv(create(&paths.validated)?, table, records, RowFilter::All)?;
    let invalid_rows = write_records_csv(
        create(&paths.invalid)?,
        table,
        records,
        RowFilter::Invalid(failed_fields),
    )?;
    write_json_report(create(&paths.report)?, report)?;
    info!(
        dir = %dir.display(),
        validated_rows,
        invalid_rows,
        "exports written"
    );
    Ok(ExportSummary {
        paths,
        validated_rows,
        invalid_rows,
    })
}

/// Writes `validated.csv`, `invalid.csv` and `report.json` for a place-only run.
pub fn export_places(
    dir: &Path,
    table: &RegistryTable,
    places: &[PlaceValidation],
    report: &ValidationReport,
) -> Result<ExportSummary, ReportError> {
    let paths = prepare_dir(dir)?;
    let validated_rows = write_places_csv(create(&paths.validated)?, table, places, false)?;
    let invalid_rows = write_places_csv(create(&paths.invalid)?, table, places, true)?;
    write_json_report(create(&paths.report)?, report)?;
    info!(
        dir = %dir.display(),
        validated_rows,
        invalid_rows,
        "exports written"
    );
    Ok(ExportSummary {
        paths,
        validated_rows,
        invalid_rows,
    })
}
