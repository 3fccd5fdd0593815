//! Single-query matching against a gazetteer index.

use kkv_gazetteer::GazetteerIndex;
use kkv_model::{AdminLevel, IndexedPlace, MatchKind};
use serde::{Deserialize, Serialize};

use crate::error::{MatchFailure, ReconcileError};
use crate::similarity::{Similarity, TokenSortRatio};

/// Default acceptance threshold for approximate matches.
pub const DEFAULT_THRESHOLD: u8 = 85;

/// Outcome of matching one normalized query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub found: bool,
    pub canonical_name: Option<String>,
    pub level: Option<AdminLevel>,
    /// 100 for exact hits, best similarity otherwise, 0 for empty queries and failures.
    pub score: f64,
    pub kind: MatchKind,
}

impl MatchResult {
    pub fn missing() -> Self {
        Self {
            found: false,
            canonical_name: None,
            level: None,
            score: 0.0,
            kind: MatchKind::Missing,
        }
    }

    pub fn failed() -> Self {
        Self {
            kind: MatchKind::Failed,
            ..Self::missing()
        }
    }

    pub fn exact(place: &IndexedPlace) -> Self {
        Self {
            found: true,
            canonical_name: Some(place.canonical_name.clone()),
            level: Some(place.level),
            score: 100.0,
            kind: MatchKind::Exact,
        }
    }

    fn approximate(place: &IndexedPlace, score: f64) -> Self {
        Self {
            found: true,
            canonical_name: Some(place.canonical_name.clone()),
            level: Some(place.level),
            score,
            kind: MatchKind::Approximate,
        }
    }

    fn near_miss(score: f64) -> Self {
        Self {
            score,
            kind: MatchKind::NoMatch,
            ..Self::missing()
        }
    }
}

/// Resolves normalized queries: exact lookup first, best-scoring candidate second.
///
/// Candidates are prepared once when the matcher is built, in the index's
/// sorted order. Ties keep the earliest candidate.
pub struct Matcher<'a, S: Similarity = TokenSortRatio> {
    index: &'a GazetteerIndex,
    scorer: S,
    threshold: u8,
    prepared: Vec<String>,
}

impl<'a> Matcher<'a, TokenSortRatio> {
    pub fn new(index: &'a GazetteerIndex, threshold: u8) -> Result<Self, ReconcileError> {
        Self::with_scorer(index, threshold, TokenSortRatio)
    }
}

impl<'a, S: Similarity> Matcher<'a, S> {
    pub fn with_scorer(
        index: &'a GazetteerIndex,
        threshold: u8,
        scorer: S,
    ) -> Result<Self, ReconcileError> {
        if threshold > 100 {
            return Err(ReconcileError::InvalidThreshold { threshold });
        }
        let prepared = index
            .candidates()
            .iter()
            .map(|candidate| scorer.prepare(candidate))
            .collect();
        Ok(Self {
            index,
            scorer,
            threshold,
            prepared,
        })
    }

    pub fn index(&self) -> &'a GazetteerIndex {
        self.index
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Exact lookup only. Never scores.
    pub fn match_exact(&self, query: &str) -> Option<MatchResult> {
        self.index.get(query).map(MatchResult::exact)
    }

    /// Matches one normalized query.
    pub fn match_query(&self, query: Option<&str>) -> Result<MatchResult, MatchFailure> {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return Ok(MatchResult::missing());
        };
        if let Some(exact) = self.match_exact(query) {
            return Ok(exact);
        }
        self.match_approximate(query)
    }

    /// Scores the query against every candidate and applies the threshold.
    pub fn match_approximate(&self, query: &str) -> Result<MatchResult, MatchFailure> {
        let Some((position, score)) = self.best_candidate(query)? else {
            return Ok(MatchResult::near_miss(0.0));
        };
        if score < f64::from(self.threshold) {
            return Ok(MatchResult::near_miss(score));
        }
        let place = self
            .index
            .candidates()
            .get(position)
            .and_then(|key| self.index.get(key));
        Ok(match place {
            Some(place) => MatchResult::approximate(place, score),
            None => MatchResult::near_miss(score),
        })
    }

    fn best_candidate(&self, query: &str) -> Result<Option<(usize, f64)>, MatchFailure> {
        let query = self.scorer.prepare(query);
        let mut best: Option<(usize, f64)> = None;
        for (position, candidate) in self.prepared.iter().enumerate() {
            let score = self.scorer.score(&query, candidate)?;
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(MatchFailure::ScoreOutOfRange { score });
            }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((position, score));
            }
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kkv_gazetteer::GazetteerIndex;
    use kkv_model::GazetteerEntry;

    use super::*;

    fn entry(name: &str, key: &str, level: AdminLevel) -> GazetteerEntry {
        GazetteerEntry {
            canonical_name: name.to_string(),
            normalized_name: key.to_string(),
            level,
        }
    }

    fn index() -> GazetteerIndex {
        GazetteerIndex::from_entries(vec![
            entry("Sukamaju", "SUKAMAJU", AdminLevel::Village),
            entry("Kota Bandung", "BANDUNG", AdminLevel::Regency),
            entry("DKI Jakarta", "JAKARTA", AdminLevel::Province),
        ])
    }

    /// Returns a fixed score and counts calls.
    struct FixedScore {
        score: f64,
        calls: AtomicUsize,
    }

    impl FixedScore {
        fn new(score: f64) -> Self {
            Self {
                score,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Similarity for FixedScore {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn score(&self, _query: &str, _candidate: &str) -> Result<f64, MatchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }
    }

    #[test]
    fn exact_hit_never_scores() {
        let index = index();
        let matcher = Matcher::with_scorer(&index, 85, FixedScore::new(50.0)).unwrap();
        let result = matcher.match_query(Some("JAKARTA")).unwrap();
        assert!(result.found);
        assert_eq!(result.kind, MatchKind::Exact);
        assert_eq!(result.canonical_name.as_deref(), Some("DKI Jakarta"));
        assert_eq!(result.level, Some(AdminLevel::Province));
        assert!((result.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(matcher.scorer().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_query_is_missing() {
        let index = index();
        let matcher = Matcher::with_scorer(&index, 85, FixedScore::new(99.0)).unwrap();
        for query in [None, Some("")] {
            let result = matcher.match_query(query).unwrap();
            assert!(!result.found);
            assert_eq!(result.kind, MatchKind::Missing);
            assert_eq!(result.score, 0.0);
        }
        assert_eq!(matcher.scorer().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let index = index();
        let at = Matcher::with_scorer(&index, 85, FixedScore::new(85.0)).unwrap();
        let result = at.match_query(Some("NOWHERE")).unwrap();
        assert!(result.found);
        assert_eq!(result.kind, MatchKind::Approximate);
        // Ties keep the first candidate in sorted order.
        assert_eq!(result.canonical_name.as_deref(), Some("Kota Bandung"));

        let below = Matcher::with_scorer(&index, 85, FixedScore::new(84.0)).unwrap();
        let result = below.match_query(Some("NOWHERE")).unwrap();
        assert!(!result.found);
        assert_eq!(result.kind, MatchKind::NoMatch);
        assert_eq!(result.canonical_name, None);
        assert!((result.score - 84.0).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_score_fails() {
        let index = index();
        for bad in [120.0, -1.0, f64::NAN] {
            let matcher = Matcher::with_scorer(&index, 85, FixedScore::new(bad)).unwrap();
            assert!(matches!(
                matcher.match_query(Some("NOWHERE")),
                Err(MatchFailure::ScoreOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn rejects_threshold_above_hundred() {
        let index = index();
        assert!(matches!(
            Matcher::new(&index, 101),
            Err(ReconcileError::InvalidThreshold { threshold: 101 })
        ));
    }

    #[test]
    fn token_sort_finds_typo() {
        let index = index();
        let matcher = Matcher::new(&index, DEFAULT_THRESHOLD).unwrap();
        let result = matcher.match_query(Some("JAKRTA")).unwrap();
        assert!(result.found);
        assert_eq!(result.canonical_name.as_deref(), Some("DKI Jakarta"));
        assert!((result.score - 92.307_692).abs() < 1e-3);

        let result = matcher.match_query(Some("ATLANTIS")).unwrap();
        assert!(!result.found);
        assert!(result.score < 85.0);
        assert_eq!(result.canonical_name, None);
    }
}
