//! Registry record validation.
//!
//! Field predicates for identifiers, names, gender and birth dates, combined
//! with place-of-birth reconciliation into one [`ValidatedRecord`] per input
//! record.
//!
//! [`ValidatedRecord`]: kkv_model::ValidatedRecord

pub mod engine;
pub mod fields;

pub use engine::{ValidationOptions, ValidationRun, validate, validate_record, validate_records};
pub use fields::{
    GENDER_VALUES, IDENTIFIER_LENGTH, check_birth_date, check_gender, check_identifier,
    check_name, parse_birth_date,
};
