//! Place-of-birth reconciliation report.

use std::collections::BTreeMap;

use kkv_model::{AdminLevel, MatchKind, PlaceValidation};
use serde::{Deserialize, Serialize};

use crate::summary::percent;

/// Confidence histogram bins as half-open `(lower, upper]` intervals.
/// A score of exactly zero falls in none of them.
pub const CONFIDENCE_BINS: [(f64, f64); 5] = [
    (0.0, 70.0),
    (70.0, 80.0),
    (80.0, 90.0),
    (90.0, 95.0),
    (95.0, 100.0),
];

/// Corrections listed in a report.
pub const MAX_CORRECTIONS: usize = 20;

/// Invalid samples listed in a report.
pub const MAX_INVALID_SAMPLES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelShare {
    pub level: AdminLevel,
    pub count: usize,
    /// Share of valid places.
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBin {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// An approximate match applied to one or more rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub level: AdminLevel,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidSample {
    /// Row position in the input.
    pub row: usize,
    pub place_raw: Option<String>,
    pub place_normalized: Option<String>,
    pub confidence_score: f64,
    pub match_kind: MatchKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceReport {
    pub total: usize,
    pub valid: usize,
    pub valid_pct: f64,
    pub invalid: usize,
    pub invalid_pct: f64,
    pub levels: Vec<LevelShare>,
    pub confidence: Vec<ConfidenceBin>,
    pub corrections: Vec<Correction>,
    pub invalid_samples: Vec<InvalidSample>,
}

impl PlaceReport {
    /// Builds the report from place results in row order.
    pub fn build<'p, I>(places: I) -> Self
    where
        I: IntoIterator<Item = &'p PlaceValidation>,
    {
        let mut total = 0;
        let mut valid = 0;
        let mut level_counts: BTreeMap<AdminLevel, usize> = BTreeMap::new();
        let mut bins = [0usize; CONFIDENCE_BINS.len()];
        let mut corrections: BTreeMap<(String, String, AdminLevel), usize> = BTreeMap::new();
        let mut invalid_samples = Vec::new();

        for (row, place) in places.into_iter().enumerate() {
            total += 1;
            if let Some(bin) = bin_index(place.confidence_score) {
                bins[bin] += 1;
            }
            if place.is_valid {
                valid += 1;
                if let Some(level) = place.admin_level {
                    *level_counts.entry(level).or_default() += 1;
                }
            } else if invalid_samples.len() < MAX_INVALID_SAMPLES {
                invalid_samples.push(InvalidSample {
                    row,
                    place_raw: place.place_raw.clone(),
                    place_normalized: place.place_normalized.clone(),
                    confidence_score: place.confidence_score,
                    match_kind: place.match_kind,
                });
            }
            if place.match_kind == MatchKind::Approximate
                && let (Some(original), Some(corrected), Some(level)) = (
                    place.place_normalized.as_ref(),
                    place.corrected_name.as_ref(),
                    place.admin_level,
                )
            {
                *corrections
                    .entry((original.clone(), corrected.clone(), level))
                    .or_default() += 1;
            }
        }

        let levels = AdminLevel::ALL
            .iter()
            .map(|level| {
                let count = level_counts.get(level).copied().unwrap_or(0);
                LevelShare {
                    level: *level,
                    count,
                    share_pct: percent(count, valid),
                }
            })
            .collect();
        let confidence = CONFIDENCE_BINS
            .iter()
            .zip(bins)
            .map(|((lower, upper), count)| ConfidenceBin {
                label: format!("{lower:.0}-{upper:.0}"),
                lower: *lower,
                upper: *upper,
                count,
            })
            .collect();
        let mut corrections: Vec<Correction> = corrections
            .into_iter()
            .map(|((original, corrected, level), count)| Correction {
                original,
                corrected,
                level,
                count,
            })
            .collect();
        // Stable: equal counts keep key order.
        corrections.sort_by(|a, b| b.count.cmp(&a.count));
        corrections.truncate(MAX_CORRECTIONS);

        Self {
            total,
            valid,
            valid_pct: percent(valid, total),
            invalid: total - valid,
            invalid_pct: percent(total - valid, total),
            levels,
            confidence,
            corrections,
            invalid_samples,
        }
    }
}

fn bin_index(score: f64) -> Option<usize> {
    CONFIDENCE_BINS
        .iter()
        .position(|(lower, upper)| score > *lower && score <= *upper)
}
