//! Batch reconciliation of place-of-birth values.
//!
//! Rows are normalized, exact hits resolved from the lookup, and every
//! distinct remaining value is matched exactly once before the result is
//! broadcast back onto all rows that share it.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use kkv_gazetteer::GazetteerIndex;
use kkv_model::{MatchKind, PlaceValidation, RegistryRecord};
use kkv_normalization::normalize_place;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::error::{MatchFailure, ReconcileError};
use crate::matcher::{DEFAULT_THRESHOLD, MatchResult, Matcher};
use crate::progress::{CancelFlag, ProgressCallback, ProgressReporter};
use crate::similarity::{Similarity, TokenSortRatio};

/// Default number of distinct values between progress reports.
pub const DEFAULT_PROGRESS_STEP: usize = 100;

thread_local! {
    static RECOVERING: Cell<bool> = const { Cell::new(false) };
}

/// True while this thread runs a scorer whose panics the batch recovers from.
///
/// Panic hooks can check this to keep recovered panics out of the terminal.
pub fn recovering_scorer_panic() -> bool {
    RECOVERING.with(Cell::get)
}

/// Anything that carries a place-of-birth value.
pub trait PlaceOfBirth {
    fn place_of_birth(&self) -> Option<&str>;
}

impl PlaceOfBirth for RegistryRecord {
    fn place_of_birth(&self) -> Option<&str> {
        self.place_of_birth.as_deref()
    }
}

impl PlaceOfBirth for String {
    fn place_of_birth(&self) -> Option<&str> {
        Some(self)
    }
}

impl PlaceOfBirth for &str {
    fn place_of_birth(&self) -> Option<&str> {
        Some(*self)
    }
}

impl PlaceOfBirth for Option<String> {
    fn place_of_birth(&self) -> Option<&str> {
        self.as_deref()
    }
}

impl PlaceOfBirth for Option<&str> {
    fn place_of_birth(&self) -> Option<&str> {
        *self
    }
}

/// Options for a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Minimum approximate score accepted as a match, inclusive.
    pub threshold: u8,
    /// Distinct values between progress reports.
    pub progress_step: usize,
    /// Match distinct values on the rayon pool.
    pub parallel: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            progress_step: DEFAULT_PROGRESS_STEP,
            parallel: true,
        }
    }
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_progress_step(mut self, step: usize) -> Self {
        self.progress_step = step;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    pub rows: usize,
    pub missing_rows: usize,
    pub exact_rows: usize,
    pub approximate_rows: usize,
    pub no_match_rows: usize,
    pub failed_rows: usize,
    /// Distinct normalized values that needed approximate matching.
    pub distinct_queries: usize,
    pub matched_distinct: usize,
    pub failed_distinct: usize,
    pub duration_ms: u64,
}

/// Results aligned with the input rows, plus run counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutput {
    pub places: Vec<PlaceValidation>,
    pub stats: ReconcileStats,
}

/// Batch engine over one gazetteer index.
pub struct Reconciler<'a, S: Similarity = TokenSortRatio> {
    matcher: Matcher<'a, S>,
    options: ReconcileOptions,
    progress: Option<ProgressCallback<'a>>,
    cancel: Option<CancelFlag>,
}

impl<'a> Reconciler<'a, TokenSortRatio> {
    pub fn new(index: &'a GazetteerIndex, options: ReconcileOptions) -> Result<Self, ReconcileError> {
        Self::with_scorer(index, options, TokenSortRatio)
    }
}

impl<'a, S: Similarity> Reconciler<'a, S> {
    pub fn with_scorer(
        index: &'a GazetteerIndex,
        options: ReconcileOptions,
        scorer: S,
    ) -> Result<Self, ReconcileError> {
        Ok(Self {
            matcher: Matcher::with_scorer(index, options.threshold, scorer)?,
            options,
            progress: None,
            cancel: None,
        })
    }

    #[must_use]
    pub fn with_progress(mut self, callback: impl Fn(f64) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn matcher(&self) -> &Matcher<'a, S> {
        &self.matcher
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Reconciles every row. The output has one entry per input row, in order.
    pub fn reconcile<R>(&self, rows: &[R]) -> Result<ReconcileOutput, ReconcileError>
    where
        R: PlaceOfBirth + Sync,
    {
        let span = info_span!("reconcile", rows = rows.len(), threshold = self.options.threshold);
        let _guard = span.enter();
        let start = Instant::now();
        let index = self.matcher.index();

        let normalized: Vec<Option<String>> = if self.options.parallel {
            rows.par_iter()
                .map(|row| normalize_place(row.place_of_birth()))
                .collect()
        } else {
            rows.iter()
                .map(|row| normalize_place(row.place_of_birth()))
                .collect()
        };

        let mut seen = HashSet::new();
        let distinct: Vec<&str> = normalized
            .iter()
            .filter_map(|value| value.as_deref())
            .filter(|value| !value.is_empty() && !index.contains(value))
            .filter(|value| seen.insert(*value))
            .collect();
        debug!(distinct_values = distinct.len(), "collected unmatched values");

        let resolved = self.match_distinct(&distinct)?;
        let by_value: HashMap<&str, &MatchResult> = distinct
            .iter()
            .copied()
            .zip(resolved.iter())
            .collect();

        let mut stats = ReconcileStats {
            rows: rows.len(),
            distinct_queries: distinct.len(),
            matched_distinct: resolved.iter().filter(|r| r.found).count(),
            failed_distinct: resolved
                .iter()
                .filter(|r| r.kind == MatchKind::Failed)
                .count(),
            ..ReconcileStats::default()
        };

        let places: Vec<PlaceValidation> = rows
            .iter()
            .zip(&normalized)
            .map(|(row, normalized)| {
                let result = match normalized.as_deref() {
                    None | Some("") => MatchResult::missing(),
                    Some(value) => match index.get(value) {
                        Some(place) => MatchResult::exact(place),
                        None => by_value
                            .get(value)
                            .map_or_else(MatchResult::failed, |result| (*result).clone()),
                    },
                };
                match result.kind {
                    MatchKind::Exact => stats.exact_rows += 1,
                    MatchKind::Approximate => stats.approximate_rows += 1,
                    MatchKind::NoMatch => stats.no_match_rows += 1,
                    MatchKind::Missing => stats.missing_rows += 1,
                    MatchKind::Failed => stats.failed_rows += 1,
                }
                place_validation(row.place_of_birth(), normalized.clone(), result)
            })
            .collect();

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            rows = stats.rows,
            distinct_values = stats.distinct_queries,
            exact = stats.exact_rows,
            approximate = stats.approximate_rows,
            failed = stats.failed_rows,
            duration_ms = stats.duration_ms,
            "reconciliation complete"
        );
        Ok(ReconcileOutput { places, stats })
    }

    /// Matches each distinct value once, in input order.
    fn match_distinct(&self, distinct: &[&str]) -> Result<Vec<MatchResult>, ReconcileError> {
        let reporter = ProgressReporter::new(
            self.progress.as_deref(),
            distinct.len(),
            self.options.progress_step,
        );
        let run_one = |value: &&str| -> Option<MatchResult> {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                return None;
            }
            let result = self.match_recovering(value);
            reporter.tick();
            Some(result)
        };
        let results: Vec<Option<MatchResult>> = if self.options.parallel {
            distinct.par_iter().map(run_one).collect()
        } else {
            distinct.iter().map(run_one).collect()
        };

        if results.iter().any(Option::is_none) {
            let completed = reporter.completed();
            warn!(completed, total = distinct.len(), "reconciliation cancelled");
            return Err(ReconcileError::Cancelled {
                completed,
                total: distinct.len(),
            });
        }
        reporter.finish();
        Ok(results.into_iter().flatten().collect())
    }

    /// Runs the matcher, turning errors and panics into a failed result.
    fn match_recovering(&self, value: &str) -> MatchResult {
        RECOVERING.with(|flag| flag.set(true));
        let outcome = catch_unwind(AssertUnwindSafe(|| self.matcher.match_approximate(value)));
        RECOVERING.with(|flag| flag.set(false));
        let outcome = outcome.unwrap_or_else(|payload| {
            Err(MatchFailure::Panicked {
                message: panic_message(payload.as_ref()),
            })
        });
        match outcome {
            Ok(result) => result,
            Err(failure) => {
                warn!(
                    scorer = self.matcher.scorer().name(),
                    error = %failure,
                    "similarity scoring failed, value marked as failed"
                );
                MatchResult::failed()
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn place_validation(
    raw: Option<&str>,
    normalized: Option<String>,
    result: MatchResult,
) -> PlaceValidation {
    PlaceValidation {
        place_raw: raw.map(str::to_string),
        place_normalized: normalized,
        is_valid: result.found,
        corrected_name: result.canonical_name,
        admin_level: result.level,
        confidence_score: result.score,
        match_kind: result.kind,
    }
}

/// One-shot reconciliation with the default scorer.
pub fn reconcile<R>(
    rows: &[R],
    index: &GazetteerIndex,
    threshold: u8,
    on_progress: Option<&(dyn Fn(f64) + Send + Sync)>,
) -> Result<Vec<PlaceValidation>, ReconcileError>
where
    R: PlaceOfBirth + Sync,
{
    let options = ReconcileOptions::default().with_threshold(threshold);
    let mut reconciler = Reconciler::new(index, options)?;
    if let Some(callback) = on_progress {
        reconciler = reconciler.with_progress(callback);
    }
    Ok(reconciler.reconcile(rows)?.places)
}
