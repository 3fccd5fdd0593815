//! Per-field predicates.
//!
//! Each check returns the first issue found for its field, or `Ok` when the
//! value passes. Place of birth is not here: it comes from reconciliation.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate, NaiveDateTime};
use kkv_model::{RecordField, RecordIssue};
use regex::Regex;

/// Digits in a family-card or national-ID number.
pub const IDENTIFIER_LENGTH: usize = 16;

/// Accepted spellings of the gender field.
pub const GENDER_VALUES: [&str; 4] = ["LAKI-LAKI", "LAKI - LAKI", "LAKI LAKI", "PEREMPUAN"];

/// Spreadsheet day serials, optionally with a fractional time part.
static SERIAL_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,7})(\.\d+)?$").expect("Invalid serial date regex"));

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%Y%m%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Largest serial a spreadsheet accepts (9999-12-31).
const MAX_SERIAL_DAY: u64 = 2_958_465;

/// Checks a 16-digit identifier (`KK_NO` or `NIK`).
pub fn check_identifier(field: RecordField, value: Option<&str>) -> Result<(), RecordIssue> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(RecordIssue::Empty { field });
    };
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(RecordIssue::NonDigit { field });
    }
    if value.len() != IDENTIFIER_LENGTH {
        return Err(RecordIssue::WrongLength {
            field,
            length: value.len(),
        });
    }
    if value.ends_with("0000") {
        return Err(RecordIssue::TrailingZeros { field });
    }
    Ok(())
}

/// Name must be present and free of digits.
pub fn check_name(value: Option<&str>) -> Result<(), RecordIssue> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Err(RecordIssue::Empty {
            field: RecordField::Name,
        });
    };
    if value.chars().any(char::is_numeric) {
        return Err(RecordIssue::NameHasDigits);
    }
    Ok(())
}

/// Gender must be one of [`GENDER_VALUES`], compared exactly after trimming.
pub fn check_gender(value: Option<&str>) -> Result<(), RecordIssue> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(RecordIssue::Empty {
            field: RecordField::Gender,
        });
    };
    if GENDER_VALUES.contains(&value) {
        Ok(())
    } else {
        Err(RecordIssue::UnknownGender {
            value: value.to_string(),
        })
    }
}

/// Parses a birth date in any of the accepted layouts.
pub fn parse_birth_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    {
        return Some(date);
    }
    if let Some(datetime) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(datetime.date());
    }
    parse_serial_date(value)
}

/// Converts a spreadsheet day serial; day 1 is 1899-12-31.
fn parse_serial_date(value: &str) -> Option<NaiveDate> {
    let captures = SERIAL_DATE_REGEX.captures(value)?;
    let days: u64 = captures.get(1)?.as_str().parse().ok()?;
    if days == 0 || days > MAX_SERIAL_DAY {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))
}

/// Birth date must parse and must not lie after `today`.
pub fn check_birth_date(value: Option<&str>, today: NaiveDate) -> Result<NaiveDate, RecordIssue> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(RecordIssue::Empty {
            field: RecordField::DateOfBirth,
        });
    };
    let Some(date) = parse_birth_date(value) else {
        return Err(RecordIssue::DateUnparseable {
            value: value.to_string(),
        });
    };
    if date > today {
        return Err(RecordIssue::DateInFuture {
            value: value.to_string(),
        });
    }
    Ok(date)
}
