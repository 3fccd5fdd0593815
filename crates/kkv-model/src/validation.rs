//! Validation result types.
//!
//! A record's outcome is split into the five cheap field predicates
//! ([`FieldChecks`]), the place-of-birth reconciliation ([`PlaceValidation`])
//! and the issues that explain every failed check ([`RecordIssue`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::{AdminLevel, MatchKind, RecordField};

/// Place-of-birth reconciliation outcome for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceValidation {
    /// Original input string.
    pub place_raw: Option<String>,
    /// Normalizer output.
    pub place_normalized: Option<String>,
    /// Whether an exact or approximate match was found.
    pub is_valid: bool,
    /// Canonical name of the best match, absent when none was accepted.
    pub corrected_name: Option<String>,
    /// Level of the best match, absent when none was accepted.
    pub admin_level: Option<AdminLevel>,
    /// 0-100. 100 for exact matches, best similarity otherwise, 0 for empty input.
    pub confidence_score: f64,
    pub match_kind: MatchKind,
}

impl PlaceValidation {
    /// Outcome for an absent or empty place field.
    pub fn missing(place_raw: Option<String>, place_normalized: Option<String>) -> Self {
        Self {
            place_raw,
            place_normalized,
            is_valid: false,
            corrected_name: None,
            admin_level: None,
            confidence_score: 0.0,
            match_kind: MatchKind::Missing,
        }
    }
}

/// Results of the per-field predicates other than place of birth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChecks {
    pub kk_no: bool,
    pub nik: bool,
    pub name: bool,
    pub gender: bool,
    pub date_of_birth: bool,
}

/// A reason a record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordIssue {
    /// Field has no value.
    Empty { field: RecordField },
    /// Identifier contains characters other than ASCII digits.
    NonDigit { field: RecordField },
    /// Identifier has the wrong number of digits.
    WrongLength { field: RecordField, length: usize },
    /// Identifier ends with `0000`.
    TrailingZeros { field: RecordField },
    /// Name contains a digit.
    NameHasDigits,
    /// Gender is not one of the accepted spellings.
    UnknownGender { value: String },
    /// Place of birth did not resolve to a gazetteer entry.
    PlaceNotFound { value: String },
    /// Date of birth could not be parsed.
    DateUnparseable { value: String },
    /// Date of birth lies after the reference date.
    DateInFuture { value: String },
}

impl RecordIssue {
    /// Field the issue belongs to.
    pub fn field(&self) -> RecordField {
        match self {
            RecordIssue::Empty { field }
            | RecordIssue::NonDigit { field }
            | RecordIssue::WrongLength { field, .. }
            | RecordIssue::TrailingZeros { field } => *field,
            RecordIssue::NameHasDigits => RecordField::Name,
            RecordIssue::UnknownGender { .. } => RecordField::Gender,
            RecordIssue::PlaceNotFound { .. } => RecordField::PlaceOfBirth,
            RecordIssue::DateUnparseable { .. } | RecordIssue::DateInFuture { .. } => {
                RecordField::DateOfBirth
            }
        }
    }
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} is empty"),
            Self::NonDigit { field } => write!(f, "{field} contains non-digit characters"),
            Self::WrongLength { field, length } => {
                write!(f, "{field} has {length} digits, expected 16")
            }
            Self::TrailingZeros { field } => write!(f, "{field} ends with '0000'"),
            Self::NameHasDigits => write!(f, "{} contains digits", RecordField::Name),
            Self::UnknownGender { value } => write!(
                f,
                "{} '{value}' is not a recognized value",
                RecordField::Gender
            ),
            Self::PlaceNotFound { value } => write!(
                f,
                "{} '{value}' not found in gazetteer",
                RecordField::PlaceOfBirth
            ),
            Self::DateUnparseable { value } => write!(
                f,
                "{} '{value}' has an invalid date format",
                RecordField::DateOfBirth
            ),
            Self::DateInFuture { value } => {
                write!(f, "{} '{value}' is in the future", RecordField::DateOfBirth)
            }
        }
    }
}

/// Full validation outcome for one registry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    /// Position of the record in the source table.
    pub index: usize,
    pub checks: FieldChecks,
    pub place: PlaceValidation,
    pub issues: Vec<RecordIssue>,
}

impl ValidatedRecord {
    /// Whether a single field passed.
    pub fn field_valid(&self, field: RecordField) -> bool {
        match field {
            RecordField::KkNo => self.checks.kk_no,
            RecordField::Nik => self.checks.nik,
            RecordField::Name => self.checks.name,
            RecordField::Gender => self.checks.gender,
            RecordField::PlaceOfBirth => self.place.is_valid,
            RecordField::DateOfBirth => self.checks.date_of_birth,
        }
    }

    /// True when every field passed.
    pub fn all_valid(&self) -> bool {
        RecordField::ALL.iter().all(|field| self.field_valid(*field))
    }

    /// Issues joined into one note, `None` for a fully valid record.
    pub fn notes(&self) -> Option<String> {
        if self.issues.is_empty() {
            return None;
        }
        Some(
            self.issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
