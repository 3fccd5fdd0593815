//! Progress reporting and cooperative cancellation for batch runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Progress callback. Receives fractions in `[0, 1]`; must be cheap.
pub type ProgressCallback<'a> = Box<dyn Fn(f64) + Send + Sync + 'a>;

/// Shared cancellation flag. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counts completed work items and forwards throttled fractions.
pub(crate) struct ProgressReporter<'r> {
    callback: Option<&'r (dyn Fn(f64) + Send + Sync)>,
    total: usize,
    step: usize,
    completed: AtomicUsize,
}

impl<'r> ProgressReporter<'r> {
    pub(crate) fn new(
        callback: Option<&'r (dyn Fn(f64) + Send + Sync)>,
        total: usize,
        step: usize,
    ) -> Self {
        Self {
            callback,
            total,
            step: step.max(1),
            completed: AtomicUsize::new(0),
        }
    }

    /// Records one completed item. Reports every `step` items, never at the end
    /// (that is [`finish`](Self::finish)'s job).
    pub(crate) fn tick(&self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.step == 0
            && done < self.total
            && let Some(callback) = self.callback
        {
            callback(done as f64 / self.total as f64);
        }
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub(crate) fn finish(&self) {
        if let Some(callback) = self.callback {
            callback(1.0);
        }
    }
}
