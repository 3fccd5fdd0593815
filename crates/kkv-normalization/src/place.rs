//! Place-name canonicalization.
//!
//! Registry extracts spell places every way imaginable: "Kab. Bandung",
//! "DESA SUKAMAJU 02", "Jogja". The normalizer reduces such values to the
//! same key the gazetteer is indexed by.

/// Administrative prefixes, tried in order. At most one is removed.
pub const ADMIN_PREFIXES: [&str; 11] = [
    "DESA ",
    "KELURAHAN ",
    "KEL ",
    "DS ",
    "KEC ",
    "KECAMATAN ",
    "KAB ",
    "KABUPATEN ",
    "KOTA ",
    "PROVINSI ",
    "PROV ",
];

/// Known alternate spellings and their canonical key. Matched on the whole string.
pub const PLACE_ALIASES: [(&str, &str); 16] = [
    ("JKT", "JAKARTA"),
    ("JAKARTA PUSAT", "JAKARTA"),
    ("JAKARTA BARAT", "JAKARTA"),
    ("JAKARTA TIMUR", "JAKARTA"),
    ("JAKARTA SELATAN", "JAKARTA"),
    ("JAKARTA UTARA", "JAKARTA"),
    ("DKI JAKARTA", "JAKARTA"),
    ("JOGJAKARTA", "YOGYAKARTA"),
    ("JOGJA", "YOGYAKARTA"),
    ("YOGYA", "YOGYAKARTA"),
    ("KOTAWARINGIN", "KOTAWARINGIN BARAT"),
    ("KOTAWARINGIN BRT", "KOTAWARINGIN BARAT"),
    ("KOTAWARINGIN TMR", "KOTAWARINGIN TIMUR"),
    ("LIMA KOTA", "LIMA PULUH KOTA"),
    ("PEKAN BARU", "PEKANBARU"),
    ("LUBUK LINGGAU", "LUBUKLINGGAU"),
];

/// Normalizes an optional raw place name. Absent input stays absent.
pub fn normalize_place(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_place_str)
}

/// Normalizes a raw place name into its lookup key.
///
/// The result is uppercase, holds only letters separated by single spaces,
/// has at most one administrative prefix removed and has aliases resolved.
/// May be empty.
pub fn normalize_place_str(raw: &str) -> String {
    let cleaned = clean_text(raw);
    let stripped = strip_admin_prefix(&cleaned);
    apply_alias(stripped).to_string()
}

/// Uppercases, turns punctuation into spaces, drops digits and collapses whitespace.
fn clean_text(raw: &str) -> String {
    let mut buffer = String::with_capacity(raw.len());
    for ch in raw.chars().flat_map(char::to_uppercase) {
        if ch.is_numeric() {
            continue;
        }
        if ch.is_alphabetic() {
            buffer.push(ch);
        } else {
            buffer.push(' ');
        }
    }
    buffer.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes the first matching administrative prefix, if any.
pub fn strip_admin_prefix(value: &str) -> &str {
    ADMIN_PREFIXES
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value)
}

/// Replaces a whole-string alias with its canonical key.
pub fn apply_alias(value: &str) -> &str {
    PLACE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == value)
        .map_or(value, |&(_, canonical)| canonical)
}
