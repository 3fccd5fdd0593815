//! Registry validation pipeline with explicit stages.
//!
//! The stages run in order:
//! 1. **Gazetteer**: load the boundary file and build the lookup
//! 2. **Ingest**: read the registry extract and check its columns
//! 3. **Validate**: reconcile places and check every other field
//! 4. **Output**: write the augmented CSVs and the JSON report
//!
//! Each stage takes the output of the previous one and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use kkv_gazetteer::{GazetteerIndex, LoadOptions, default_gazetteer_path, load_gazetteer};
use kkv_ingest::{RecordColumns, RegistryTable, extract_records, read_registry_table};
use kkv_match::{ReconcileOptions, ReconcileStats, Reconciler};
use kkv_model::{PlaceValidation, RecordField, RegistryRecord, ValidatedRecord};
use kkv_report::{
    ExportSummary, PlaceReport, ValidationReport, ValidationSummary, export_places, export_records,
};
use kkv_validate::{ValidationOptions, validate_records};
use tracing::{debug, info, info_span, trace};

use crate::logging::redact_value;

// ============================================================================
// Stage 1: Gazetteer
// ============================================================================

/// Explicit path, else `KKV_GAZETTEER`, else the bundled location.
pub fn resolve_gazetteer_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(default_gazetteer_path, Path::to_path_buf)
}

pub fn load_index(path: &Path, delimiter: Option<u8>) -> Result<GazetteerIndex> {
    let mut options = LoadOptions::new();
    if let Some(delimiter) = delimiter {
        options = options.with_delimiter(delimiter);
    }
    load_gazetteer(path, &options)
        .with_context(|| format!("load gazetteer {}", path.display()))
}

// ============================================================================
// Stage 2: Ingest
// ============================================================================

/// Result of the ingest stage.
#[derive(Debug)]
pub struct IngestResult {
    pub input: PathBuf,
    /// Source table, kept so exports can repeat every original column.
    pub table: RegistryTable,
    pub records: Vec<RegistryRecord>,
}

/// Reads the registry extract and checks that `required` columns exist.
pub fn ingest(input: &Path, delimiter: Option<u8>, required: &[RecordField]) -> Result<IngestResult> {
    let span = info_span!("ingest", input = %input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let table = read_registry_table(input, delimiter)
        .with_context(|| format!("read registry {}", input.display()))?;
    let records = extract_records(&table, &RecordColumns::default(), required)
        .with_context(|| format!("check columns of {}", input.display()))?;
    info!(
        rows = records.len(),
        columns = table.headers.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "registry ingested"
    );
    Ok(IngestResult {
        input: input.to_path_buf(),
        table,
        records,
    })
}

// ============================================================================
// Stage 3: Validate
// ============================================================================

/// Full record validation with its report.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub records: Vec<ValidatedRecord>,
    pub report: ValidationReport,
}

/// Place-only reconciliation with its report.
#[derive(Debug)]
pub struct PlacesOutcome {
    pub places: Vec<PlaceValidation>,
    pub report: ValidationReport,
}

fn base_report(
    ingested: &IngestResult,
    index: &GazetteerIndex,
    options: &ReconcileOptions,
    stats: ReconcileStats,
    places: PlaceReport,
) -> ValidationReport {
    ValidationReport::new(index.summary(), options.threshold, stats, places)
        .with_input(ingested.input.display().to_string())
}

fn trace_invalid_samples(report: &PlaceReport) {
    for sample in &report.invalid_samples {
        trace!(
            row = sample.row,
            place = redact_value(sample.place_raw.as_deref().unwrap_or_default()),
            kind = %sample.match_kind,
            "place not reconciled"
        );
    }
}

/// Validates every record. `on_progress` receives reconciliation progress.
pub fn run_validation(
    ingested: &IngestResult,
    index: &GazetteerIndex,
    options: &ValidationOptions,
    on_progress: impl Fn(f64) + Send + Sync,
) -> Result<ValidationOutcome> {
    let reconciler = Reconciler::new(index, options.reconcile)
        .context("configure reconciler")?
        .with_progress(on_progress);
    let run = validate_records(&ingested.records, &reconciler, options.reference_date)
        .context("validate records")?;

    let places = PlaceReport::build(run.records.iter().map(|record| &record.place));
    trace_invalid_samples(&places);
    let summary = ValidationSummary::from_records(&run.records);
    debug!(
        all_valid = summary.all_valid,
        any_invalid = summary.any_invalid,
        "validation summary built"
    );
    let report = base_report(ingested, index, &options.reconcile, run.reconcile, places)
        .with_summary(summary);
    Ok(ValidationOutcome {
        records: run.records,
        report,
    })
}

/// Reconciles the place-of-birth column only.
pub fn run_places(
    ingested: &IngestResult,
    index: &GazetteerIndex,
    options: ReconcileOptions,
    on_progress: impl Fn(f64) + Send + Sync,
) -> Result<PlacesOutcome> {
    let reconciler = Reconciler::new(index, options)
        .context("configure reconciler")?
        .with_progress(on_progress);
    let output = reconciler
        .reconcile(&ingested.records)
        .context("reconcile places")?;

    let places = PlaceReport::build(&output.places);
    trace_invalid_samples(&places);
    let report = base_report(ingested, index, &options, output.stats, places);
    Ok(PlacesOutcome {
        places: output.places,
        report,
    })
}

// ============================================================================
// Stage 4: Output
// ============================================================================

/// `<input dir>/output`.
pub fn default_output_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join("output")
}

pub fn write_validation_outputs(
    output_dir: &Path,
    ingested: &IngestResult,
    outcome: &ValidationOutcome,
    failed_fields: &[RecordField],
) -> Result<ExportSummary> {
    export_records(
        output_dir,
        &ingested.table,
        &outcome.records,
        failed_fields,
        &outcome.report,
    )
    .with_context(|| format!("write outputs to {}", output_dir.display()))
}

pub fn write_places_outputs(
    output_dir: &Path,
    ingested: &IngestResult,
    outcome: &PlacesOutcome,
) -> Result<ExportSummary> {
    export_places(output_dir, &ingested.table, &outcome.places, &outcome.report)
        .with_context(|| format!("write outputs to {}", output_dir.display()))
}
