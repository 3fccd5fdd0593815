/// Failure to score one query. Recovered per distinct value by the batch engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchFailure {
    #[error("similarity score {score} is outside 0..=100")]
    ScoreOutOfRange { score: f64 },

    #[error("similarity scorer failed: {message}")]
    Scorer { message: String },

    #[error("similarity scorer panicked: {message}")]
    Panicked { message: String },
}

/// Failure of a whole reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("invalid threshold {threshold}: must be between 0 and 100")]
    InvalidThreshold { threshold: u8 },

    #[error("reconciliation cancelled after {completed} of {total} distinct values")]
    Cancelled { completed: usize, total: usize },
}
