use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use kkv_gazetteer::GazetteerSummary;
use kkv_ingest::{ALL_FIELDS, PLACE_ONLY};
use kkv_match::ReconcileOptions;
use kkv_validate::ValidationOptions;
use tracing::{info, info_span};

use kkv_cli::pipeline::{
    IngestResult, default_output_dir, ingest, load_index, resolve_gazetteer_path, run_places,
    run_validation, write_places_outputs, write_validation_outputs,
};

use crate::cli::{GazetteerArgs, RunArgs};
use crate::types::{RunKind, RunResult};

/// Progress bar resolution.
const PROGRESS_LENGTH: u64 = 1000;

pub fn run_validate(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("validate_command", input = %args.input.display());
    let _guard = span.enter();

    let index = load_index(&resolve_gazetteer_path(args.gazetteer.as_deref()), None)?;
    let ingested = ingest(&args.input, args.delimiter, ALL_FIELDS)?;
    let progress = progress_bar(args, "Validating records");
    let outcome = run_validation(
        &ingested,
        &index,
        &ValidationOptions::new().with_reconcile(reconcile_options(args)),
        progress_callback(progress.clone()),
    );
    progress.finish_and_clear();
    let outcome = outcome?;

    let exports = if args.dry_run {
        info!("dry run, skipping outputs");
        None
    } else {
        let dir = output_dir(args, &ingested);
        Some(write_validation_outputs(
            &dir,
            &ingested,
            &outcome,
            &args.failed_fields,
        )?)
    };
    Ok(RunResult {
        kind: RunKind::Validate,
        input: ingested.input,
        report: outcome.report,
        exports,
    })
}

pub fn run_places_only(args: &RunArgs) -> Result<RunResult> {
    let span = info_span!("places_command", input = %args.input.display());
    let _guard = span.enter();

    let index = load_index(&resolve_gazetteer_path(args.gazetteer.as_deref()), None)?;
    let ingested = ingest(&args.input, args.delimiter, PLACE_ONLY)?;
    let progress = progress_bar(args, "Reconciling places");
    let outcome = run_places(
        &ingested,
        &index,
        reconcile_options(args),
        progress_callback(progress.clone()),
    );
    progress.finish_and_clear();
    let outcome = outcome?;

    let exports = if args.dry_run {
        info!("dry run, skipping outputs");
        None
    } else {
        let dir = output_dir(args, &ingested);
        Some(write_places_outputs(&dir, &ingested, &outcome)?)
    };
    Ok(RunResult {
        kind: RunKind::Places,
        input: ingested.input,
        report: outcome.report,
        exports,
    })
}

pub fn run_gazetteer(args: &GazetteerArgs) -> Result<GazetteerSummary> {
    let path = resolve_gazetteer_path(args.path.as_deref());
    let index = load_index(&path, args.delimiter)?;
    Ok(index.summary())
}

fn reconcile_options(args: &RunArgs) -> ReconcileOptions {
    ReconcileOptions::new()
        .with_threshold(args.threshold)
        .with_parallel(!args.sequential)
}

fn output_dir(args: &RunArgs, ingested: &IngestResult) -> PathBuf {
    args.output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&ingested.input))
}

fn progress_bar(args: &RunArgs, message: &'static str) -> ProgressBar {
    if args.no_progress || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(PROGRESS_LENGTH);
    let style = ProgressStyle::with_template(
        "  {spinner:.blue} [{elapsed_precise}] {bar:30.green/blue} {percent:>3}% {msg}",
    )
    .map(|style| style.progress_chars("█▉▊▋▌▍▎▏  "))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message(message);
    bar
}

fn progress_callback(bar: ProgressBar) -> impl Fn(f64) + Send + Sync {
    move |fraction| bar.set_position((fraction * PROGRESS_LENGTH as f64).round() as u64)
}
