//! JSON run report.

use chrono::{SecondsFormat, Utc};
use kkv_gazetteer::GazetteerSummary;
use kkv_match::ReconcileStats;
use serde::{Deserialize, Serialize};

use crate::place_report::PlaceReport;
use crate::summary::ValidationSummary;

/// Everything known about one run, bundled for `report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub generated_at: String,
    pub input: Option<String>,
    pub threshold: u8,
    pub gazetteer: GazetteerSummary,
    pub reconciliation: ReconcileStats,
    /// Absent for place-only runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ValidationSummary>,
    pub places: PlaceReport,
}

impl ValidationReport {
    pub fn new(
        gazetteer: GazetteerSummary,
        threshold: u8,
        reconciliation: ReconcileStats,
        places: PlaceReport,
    ) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            input: None,
            threshold,
            gazetteer,
            reconciliation,
            summary: None,
            places,
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: ValidationSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}
