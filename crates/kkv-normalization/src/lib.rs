//! Place-name normalization.
//!
//! Turns free-text place-of-birth values and gazetteer names into comparable
//! keys. Everything here is pure and allocation-light so the batch engine can
//! call it once per row.

pub mod place;

pub use place::{
    ADMIN_PREFIXES, PLACE_ALIASES, apply_alias, normalize_place, normalize_place_str,
    strip_admin_prefix,
};
