use serde::{Deserialize, Serialize};

use crate::enums::RecordField;

/// One population-registry record as read from an extract.
///
/// Every field is optional: an empty cell is represented as `None` and the
/// predicates decide what absence means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Zero-based position of the record in the source table.
    pub index: usize,
    pub kk_no: Option<String>,
    pub nik: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub place_of_birth: Option<String>,
    pub date_of_birth: Option<String>,
}

impl RegistryRecord {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Raw value of a field.
    pub fn get(&self, field: RecordField) -> Option<&str> {
        let value = match field {
            RecordField::KkNo => &self.kk_no,
            RecordField::Nik => &self.nik,
            RecordField::Name => &self.name,
            RecordField::Gender => &self.gender,
            RecordField::PlaceOfBirth => &self.place_of_birth,
            RecordField::DateOfBirth => &self.date_of_birth,
        };
        value.as_deref()
    }

    /// Set a field; empty or whitespace-only values are stored as `None`.
    pub fn set(&mut self, field: RecordField, value: Option<String>) {
        let value = value.filter(|v| !v.trim().is_empty());
        match field {
            RecordField::KkNo => self.kk_no = value,
            RecordField::Nik => self.nik = value,
            RecordField::Name => self.name = value,
            RecordField::Gender => self.gender = value,
            RecordField::PlaceOfBirth => self.place_of_birth = value,
            RecordField::DateOfBirth => self.date_of_birth = value,
        }
    }

    #[must_use]
    pub fn with(mut self, field: RecordField, value: &str) -> Self {
        self.set(field, Some(value.to_string()));
        self
    }
}
