pub mod enums;
pub mod gazetteer;
pub mod record;
pub mod validation;

pub use enums::{AdminLevel, MatchKind, RecordField};
pub use gazetteer::{GazetteerEntry, IndexedPlace};
pub use record::RegistryRecord;
pub use validation::{FieldChecks, PlaceValidation, RecordIssue, ValidatedRecord};
