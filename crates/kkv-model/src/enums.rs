//! Type-safe enumerations for registry validation.
//!
//! Administrative levels, match outcomes and record fields are represented as
//! strings in source files and exports; these enums keep them typed in between.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tier of the administrative hierarchy a gazetteer entry belongs to.
///
/// Ordered from the finest tier to the coarsest. The gazetteer is built in
/// this order, which matters for name collisions (later tiers win).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    /// Village or urban ward (desa / kelurahan).
    Village,
    /// District (kecamatan).
    District,
    /// Regency or city (kabupaten / kota).
    Regency,
    /// Province (provinsi).
    Province,
}

impl AdminLevel {
    /// All levels in gazetteer construction order.
    pub const ALL: [AdminLevel; 4] = [
        AdminLevel::Village,
        AdminLevel::District,
        AdminLevel::Regency,
        AdminLevel::Province,
    ];

    /// Returns the canonical lowercase name used in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminLevel::Village => "village",
            AdminLevel::District => "district",
            AdminLevel::Regency => "regency",
            AdminLevel::Province => "province",
        }
    }

    /// Human-readable label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            AdminLevel::Village => "Village / ward",
            AdminLevel::District => "District",
            AdminLevel::Regency => "Regency / city",
            AdminLevel::Province => "Province",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdminLevel {
    type Err = String;

    /// Accepts the English names and the Indonesian source labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "village" | "ward" | "desa" | "kelurahan" => Ok(AdminLevel::Village),
            "district" | "kecamatan" => Ok(AdminLevel::District),
            "regency" | "city" | "kabupaten" | "kota" => Ok(AdminLevel::Regency),
            "province" | "provinsi" => Ok(AdminLevel::Province),
            _ => Err(format!("Unknown administrative level: {s}")),
        }
    }
}

/// How a place-of-birth value was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Normalized value is a gazetteer key.
    Exact,
    /// Best approximate candidate reached the threshold.
    Approximate,
    /// Best approximate candidate stayed below the threshold.
    NoMatch,
    /// Place field was absent or normalized to an empty string.
    Missing,
    /// Similarity computation failed for this value.
    Failed,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Approximate => "approximate",
            MatchKind::NoMatch => "no_match",
            MatchKind::Missing => "missing",
            MatchKind::Failed => "failed",
        }
    }

    /// True when the value resolved to a gazetteer entry.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchKind::Exact | MatchKind::Approximate)
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated field of a registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    KkNo,
    Nik,
    Name,
    Gender,
    PlaceOfBirth,
    DateOfBirth,
}

impl RecordField {
    /// All fields in report order.
    pub const ALL: [RecordField; 6] = [
        RecordField::KkNo,
        RecordField::Nik,
        RecordField::Name,
        RecordField::Gender,
        RecordField::PlaceOfBirth,
        RecordField::DateOfBirth,
    ];

    /// Column header used by registry extracts.
    pub fn default_column(&self) -> &'static str {
        match self {
            RecordField::KkNo => "KK_NO",
            RecordField::Nik => "NIK",
            RecordField::Name => "CUSTNAME",
            RecordField::Gender => "JENIS_KELAMIN",
            RecordField::PlaceOfBirth => "TEMPAT_LAHIR",
            RecordField::DateOfBirth => "TANGGAL_LAHIR",
        }
    }

    /// Human-readable label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::KkNo => "Family card no.",
            RecordField::Nik => "National ID",
            RecordField::Name => "Name",
            RecordField::Gender => "Gender",
            RecordField::PlaceOfBirth => "Place of birth",
            RecordField::DateOfBirth => "Date of birth",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.default_column())
    }
}

impl FromStr for RecordField {
    type Err = String;

    /// Parses either the column header or the snake_case field name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        match normalized.as_str() {
            "KK_NO" | "KK" => Ok(RecordField::KkNo),
            "NIK" => Ok(RecordField::Nik),
            "CUSTNAME" | "NAME" => Ok(RecordField::Name),
            "JENIS_KELAMIN" | "GENDER" => Ok(RecordField::Gender),
            "TEMPAT_LAHIR" | "PLACE_OF_BIRTH" | "PLACE" => Ok(RecordField::PlaceOfBirth),
            "TANGGAL_LAHIR" | "DATE_OF_BIRTH" | "DOB" => Ok(RecordField::DateOfBirth),
            _ => Err(format!("Unknown record field: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_level_parses_source_labels() {
        assert_eq!("desa".parse::<AdminLevel>().unwrap(), AdminLevel::Village);
        assert_eq!(
            "KECAMATAN".parse::<AdminLevel>().unwrap(),
            AdminLevel::District
        );
        assert_eq!("kota".parse::<AdminLevel>().unwrap(), AdminLevel::Regency);
        assert_eq!(
            " Province ".parse::<AdminLevel>().unwrap(),
            AdminLevel::Province
        );
        assert!("dusun".parse::<AdminLevel>().is_err());
    }

    #[test]
    fn admin_level_order_follows_hierarchy() {
        assert!(AdminLevel::Village < AdminLevel::District);
        assert!(AdminLevel::Regency < AdminLevel::Province);
        assert_eq!(AdminLevel::ALL.first(), Some(&AdminLevel::Village));
    }

    #[test]
    fn record_field_round_trips_column_names() {
        for field in RecordField::ALL {
            assert_eq!(
                field.default_column().parse::<RecordField>().unwrap(),
                field
            );
        }
        assert_eq!(
            "place-of-birth".parse::<RecordField>().unwrap(),
            RecordField::PlaceOfBirth
        );
    }

    #[test]
    fn only_exact_and_approximate_count_as_match() {
        assert!(MatchKind::Exact.is_match());
        assert!(MatchKind::Approximate.is_match());
        assert!(!MatchKind::NoMatch.is_match());
        assert!(!MatchKind::Missing.is_match());
        assert!(!MatchKind::Failed.is_match());
    }
}
