//! Whole-record validation.

use std::time::Instant;

use chrono::{Local, NaiveDate};
use kkv_gazetteer::GazetteerIndex;
use kkv_match::{ReconcileError, ReconcileOptions, ReconcileStats, Reconciler, Similarity};
use kkv_model::{
    FieldChecks, MatchKind, PlaceValidation, RecordField, RecordIssue, RegistryRecord,
    ValidatedRecord,
};
use rayon::prelude::*;
use tracing::{info, info_span};

use crate::fields::{check_birth_date, check_gender, check_identifier, check_name};

/// Options for a validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    pub reconcile: ReconcileOptions,
    /// Birth dates after this day are rejected.
    pub reference_date: NaiveDate,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            reconcile: ReconcileOptions::default(),
            reference_date: Local::now().date_naive(),
        }
    }
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reconcile(mut self, reconcile: ReconcileOptions) -> Self {
        self.reconcile = reconcile;
        self
    }

    #[must_use]
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }
}

/// Records in input order plus the reconciliation counters.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRun {
    pub records: Vec<ValidatedRecord>,
    pub reconcile: ReconcileStats,
}

/// Applies the field predicates to one record and attaches its place result.
pub fn validate_record(
    record: &RegistryRecord,
    place: PlaceValidation,
    reference_date: NaiveDate,
) -> ValidatedRecord {
    let mut issues = Vec::new();
    let mut pass = |outcome: Result<(), RecordIssue>| match outcome {
        Ok(()) => true,
        Err(issue) => {
            issues.push(issue);
            false
        }
    };
    let kk_no = pass(check_identifier(RecordField::KkNo, record.kk_no.as_deref()));
    let nik = pass(check_identifier(RecordField::Nik, record.nik.as_deref()));
    let name = pass(check_name(record.name.as_deref()));
    let gender = pass(check_gender(record.gender.as_deref()));
    pass(place_issue(&place));
    let date_of_birth = pass(
        check_birth_date(record.date_of_birth.as_deref(), reference_date).map(|_| ()),
    );

    ValidatedRecord {
        index: record.index,
        checks: FieldChecks {
            kk_no,
            nik,
            name,
            gender,
            date_of_birth,
        },
        place,
        issues,
    }
}

fn place_issue(place: &PlaceValidation) -> Result<(), RecordIssue> {
    if place.is_valid {
        return Ok(());
    }
    match (place.match_kind, place.place_raw.as_deref()) {
        (MatchKind::Missing, _) | (_, None) => Err(RecordIssue::Empty {
            field: RecordField::PlaceOfBirth,
        }),
        (_, Some(raw)) => Err(RecordIssue::PlaceNotFound {
            value: raw.to_string(),
        }),
    }
}

/// Reconciles places with `reconciler`, then checks every other field.
pub fn validate_records<S: Similarity>(
    records: &[RegistryRecord],
    reconciler: &Reconciler<'_, S>,
    reference_date: NaiveDate,
) -> Result<ValidationRun, ReconcileError> {
    let span = info_span!("validate", rows = records.len());
    let _guard = span.enter();
    let start = Instant::now();

    let output = reconciler.reconcile(records)?;
    let validated: Vec<ValidatedRecord> = if reconciler.options().parallel {
        records
            .par_iter()
            .zip(output.places.into_par_iter())
            .map(|(record, place)| validate_record(record, place, reference_date))
            .collect()
    } else {
        records
            .iter()
            .zip(output.places)
            .map(|(record, place)| validate_record(record, place, reference_date))
            .collect()
    };

    let all_valid = validated.iter().filter(|r| r.all_valid()).count();
    info!(
        rows = validated.len(),
        all_valid,
        duration_ms = start.elapsed().as_millis() as u64,
        "validation complete"
    );
    Ok(ValidationRun {
        records: validated,
        reconcile: output.stats,
    })
}

/// One-shot validation with the default scorer and no progress reporting.
pub fn validate(
    records: &[RegistryRecord],
    index: &GazetteerIndex,
    options: &ValidationOptions,
) -> Result<ValidationRun, ReconcileError> {
    let reconciler = Reconciler::new(index, options.reconcile)?;
    validate_records(records, &reconciler, options.reference_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn valid_record() -> RegistryRecord {
        RegistryRecord::new(0)
            .with(RecordField::KkNo, "3273010101900001")
            .with(RecordField::Nik, "3273015507900002")
            .with(RecordField::Name, "SITI AMINAH")
            .with(RecordField::Gender, "PEREMPUAN")
            .with(RecordField::PlaceOfBirth, "Bandung")
            .with(RecordField::DateOfBirth, "1990-07-15")
    }

    fn found_place() -> PlaceValidation {
        PlaceValidation {
            place_raw: Some("Bandung".to_string()),
            place_normalized: Some("BANDUNG".to_string()),
            is_valid: true,
            corrected_name: Some("Kota Bandung".to_string()),
            admin_level: Some(kkv_model::AdminLevel::Regency),
            confidence_score: 100.0,
            match_kind: MatchKind::Exact,
        }
    }

    #[test]
    fn clean_record_has_no_issues() {
        let validated = validate_record(&valid_record(), found_place(), today());
        assert!(validated.all_valid());
        assert!(validated.issues.is_empty());
        assert_eq!(validated.notes(), None);
    }

    #[test]
    fn every_failing_field_gets_a_note() {
        let record = RegistryRecord::new(4)
            .with(RecordField::KkNo, "3273010101900000")
            .with(RecordField::Nik, "12345")
            .with(RecordField::Name, "AGUS 2")
            .with(RecordField::Gender, "PRIA")
            .with(RecordField::PlaceOfBirth, "Atlantis")
            .with(RecordField::DateOfBirth, "2030-01-01");
        let place = PlaceValidation {
            place_raw: Some("Atlantis".to_string()),
            place_normalized: Some("ATLANTIS".to_string()),
            is_valid: false,
            corrected_name: None,
            admin_level: None,
            confidence_score: 40.0,
            match_kind: MatchKind::NoMatch,
        };
        let validated = validate_record(&record, place, today());
        assert!(!validated.all_valid());
        assert_eq!(validated.index, 4);
        assert_eq!(validated.checks, FieldChecks::default());
        assert_eq!(
            validated.notes().as_deref(),
            Some(
                "KK_NO ends with '0000'; NIK has 5 digits, expected 16; \
                 CUSTNAME contains digits; JENIS_KELAMIN 'PRIA' is not a recognized value; \
                 TEMPAT_LAHIR 'Atlantis' not found in gazetteer; \
                 TANGGAL_LAHIR '2030-01-01' is in the future"
            )
        );
    }

    #[test]
    fn missing_place_is_reported_as_empty() {
        let record = valid_record();
        let validated = validate_record(&record, PlaceValidation::missing(None, None), today());
        assert!(!validated.field_valid(RecordField::PlaceOfBirth));
        assert_eq!(
            validated.issues,
            vec![RecordIssue::Empty {
                field: RecordField::PlaceOfBirth
            }]
        );
    }
}
