use std::path::PathBuf;

use kkv_report::{ExportSummary, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Validate,
    Places,
}

#[derive(Debug)]
pub struct RunResult {
    pub kind: RunKind,
    pub input: PathBuf,
    pub report: ValidationReport,
    /// `None` for dry runs.
    pub exports: Option<ExportSummary>,
}
