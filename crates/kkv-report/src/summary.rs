//! Per-field validation statistics.

use kkv_model::{RecordField, ValidatedRecord};
use serde::{Deserialize, Serialize};

/// Valid/invalid counts for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub field: RecordField,
    pub column: String,
    pub valid: usize,
    pub valid_pct: f64,
    pub invalid: usize,
    pub invalid_pct: f64,
}

/// Counts and percentages over a validated batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub all_valid: usize,
    pub all_valid_pct: f64,
    pub any_invalid: usize,
    pub any_invalid_pct: f64,
    pub fields: Vec<FieldSummary>,
}

impl ValidationSummary {
    pub fn from_records(records: &[ValidatedRecord]) -> Self {
        let total = records.len();
        let all_valid = records.iter().filter(|r| r.all_valid()).count();
        let fields = RecordField::ALL
            .iter()
            .map(|field| {
                let valid = records.iter().filter(|r| r.field_valid(*field)).count();
                FieldSummary {
                    field: *field,
                    column: field.default_column().to_string(),
                    valid,
                    valid_pct: percent(valid, total),
                    invalid: total - valid,
                    invalid_pct: percent(total - valid, total),
                }
            })
            .collect();
        Self {
            total,
            all_valid,
            all_valid_pct: percent(all_valid, total),
            any_invalid: total - all_valid,
            any_invalid_pct: percent(total - all_valid, total),
            fields,
        }
    }

    pub fn field(&self, field: RecordField) -> Option<&FieldSummary> {
        self.fields.iter().find(|summary| summary.field == field)
    }
}

/// `part` as a percentage of `total`; zero for an empty batch.
pub fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use kkv_model::{FieldChecks, PlaceValidation, RecordIssue};

    use super::*;

    fn record(index: usize, nik_ok: bool) -> ValidatedRecord {
        let mut place = PlaceValidation::missing(Some("Bandung".into()), Some("BANDUNG".into()));
        place.is_valid = true;
        ValidatedRecord {
            index,
            checks: FieldChecks {
                kk_no: true,
                nik: nik_ok,
                name: true,
                gender: true,
                date_of_birth: true,
            },
            place,
            issues: if nik_ok {
                Vec::new()
            } else {
                vec![RecordIssue::NonDigit {
                    field: RecordField::Nik,
                }]
            },
        }
    }

    #[test]
    fn counts_fields_and_records() {
        let records = vec![record(0, true), record(1, false), record(2, true), record(3, true)];
        let summary = ValidationSummary::from_records(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.all_valid, 3);
        assert!((summary.all_valid_pct - 75.0).abs() < 1e-9);
        assert_eq!(summary.any_invalid, 1);

        let nik = summary.field(RecordField::Nik).unwrap();
        assert_eq!(nik.invalid, 1);
        assert!((nik.invalid_pct - 25.0).abs() < 1e-9);
        assert_eq!(summary.field(RecordField::PlaceOfBirth).unwrap().valid, 4);
    }

    #[test]
    fn empty_batch_has_zero_percentages() {
        let summary = ValidationSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.all_valid_pct, 0.0);
        assert_eq!(summary.fields.len(), 6);
    }
}
