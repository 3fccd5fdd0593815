//! Place-of-birth matching.
//!
//! [`Matcher`] resolves one normalized value against a
//! [`GazetteerIndex`](kkv_gazetteer::GazetteerIndex); [`Reconciler`] runs it
//! over a whole batch, matching each distinct unresolved value once on the
//! rayon pool.

pub mod batch;
pub mod error;
pub mod matcher;
pub mod progress;
pub mod similarity;

pub use batch::{
    DEFAULT_PROGRESS_STEP, PlaceOfBirth, ReconcileOptions, ReconcileOutput, ReconcileStats,
    Reconciler, reconcile, recovering_scorer_panic,
};
pub use error::{MatchFailure, ReconcileError};
pub use matcher::{DEFAULT_THRESHOLD, MatchResult, Matcher};
pub use progress::{CancelFlag, ProgressCallback};
pub use similarity::{Similarity, TokenSortRatio, token_sort_ratio};
