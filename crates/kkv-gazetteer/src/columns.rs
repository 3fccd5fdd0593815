//! Column configuration for boundary tables.

use kkv_model::AdminLevel;
use serde::{Deserialize, Serialize};

/// Column names of an administrative boundary table.
///
/// Defaults follow the published village boundary extract: `NAMOBJ` holds the
/// village object code and `WADMKD` / `WADMKC` / `WADMKK` / `WADMPR` the
/// village, district, regency and province names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteerColumns {
    /// Village code column. Optional in the source.
    pub village_code: String,
    pub village: String,
    pub district: String,
    pub regency: String,
    pub province: String,
}

impl Default for GazetteerColumns {
    fn default() -> Self {
        Self {
            village_code: "NAMOBJ".to_string(),
            village: "WADMKD".to_string(),
            district: "WADMKC".to_string(),
            regency: "WADMKK".to_string(),
            province: "WADMPR".to_string(),
        }
    }
}

impl GazetteerColumns {
    /// Name column for a level.
    pub fn name_column(&self, level: AdminLevel) -> &str {
        match level {
            AdminLevel::Village => &self.village,
            AdminLevel::District => &self.district,
            AdminLevel::Regency => &self.regency,
            AdminLevel::Province => &self.province,
        }
    }
}

/// Options for [`load_gazetteer`](crate::load_gazetteer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub columns: GazetteerColumns,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            columns: GazetteerColumns::default(),
            delimiter: b',',
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_columns(mut self, columns: GazetteerColumns) -> Self {
        self.columns = columns;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}
