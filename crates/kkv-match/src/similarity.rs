//! Pluggable string similarity.

use rapidfuzz::fuzz;

use crate::error::MatchFailure;

/// A similarity measure on a 0-100 scale.
///
/// `prepare` runs once per candidate when a matcher is built and once per
/// query, so `score` only compares prepared strings.
pub trait Similarity: Send + Sync {
    fn name(&self) -> &'static str;

    fn prepare(&self, value: &str) -> String {
        value.to_string()
    }

    fn score(&self, query: &str, candidate: &str) -> Result<f64, MatchFailure>;
}

/// Token-sort ratio: whitespace tokens are sorted and rejoined, then compared
/// with the normalized Indel similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl Similarity for TokenSortRatio {
    fn name(&self) -> &'static str {
        "token_sort_ratio"
    }

    fn prepare(&self, value: &str) -> String {
        let mut tokens: Vec<&str> = value.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    }

    fn score(&self, query: &str, candidate: &str) -> Result<f64, MatchFailure> {
        Ok(fuzz::ratio(query.chars(), candidate.chars()) * 100.0)
    }
}

/// Prepares both sides and scores them. Convenience for one-off comparisons.
pub fn token_sort_ratio(left: &str, right: &str) -> f64 {
    let scorer = TokenSortRatio;
    let left = scorer.prepare(left);
    let right = scorer.prepare(right);
    fuzz::ratio(left.chars(), right.chars()) * 100.0
}
