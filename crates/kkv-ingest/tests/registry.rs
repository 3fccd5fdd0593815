use std::fs;
use std::path::{Path, PathBuf};

use kkv_ingest::{
    ALL_FIELDS, IngestError, PLACE_ONLY, RecordColumns, extract_records, read_registry_table,
};
use tempfile::TempDir;

fn temp_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

const EXTRACT: &str = "\u{feff}KK_NO;NIK;CUSTNAME;JENIS_KELAMIN;TEMPAT_LAHIR;TANGGAL_LAHIR
3273010101900001;3273015507900002;SITI AMINAH;PEREMPUAN;Kab. Bandung;1990-07-15

3273010101900001;3273011203850003;BUDI SANTOSO ; LAKI-LAKI;;12/03/1985
3273010101900001;3273011203850004;AGUS
";

#[test]
fn reads_extract_with_sniffed_delimiter() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "extract.csv", EXTRACT);
    let table = read_registry_table(&path, None).expect("read extract");

    assert_eq!(table.headers.len(), 6);
    assert_eq!(table.headers[0], "KK_NO");
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.rows[1][2], "BUDI SANTOSO");
    assert_eq!(table.rows[2], vec![
        "3273010101900001",
        "3273011203850004",
        "AGUS",
        "",
        "",
        ""
    ]);
}

#[test]
fn extracts_typed_records() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "extract.csv", EXTRACT);
    let table = read_registry_table(&path, Some(b';')).expect("read extract");
    let records = extract_records(&table, &RecordColumns::new(), ALL_FIELDS).expect("records");

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].place_of_birth.as_deref(), Some("Kab. Bandung"));
    assert_eq!(records[1].gender.as_deref(), Some("LAKI-LAKI"));
    assert_eq!(records[1].place_of_birth, None);
    assert_eq!(records[1].date_of_birth.as_deref(), Some("12/03/1985"));
    assert_eq!(records[2].gender, None);
}

#[test]
fn place_only_extract_is_accepted() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "places.csv", "tempat_lahir\nJakarta\nJogja\n");
    let table = read_registry_table(&path, None).expect("read extract");

    let records = extract_records(&table, &RecordColumns::new(), PLACE_ONLY).expect("records");
    assert_eq!(records.len(), 2);

    let err = extract_records(&table, &RecordColumns::new(), ALL_FIELDS).unwrap_err();
    assert!(matches!(err, IngestError::InputShape { ref missing } if missing.len() == 5));
}

#[test]
fn empty_file_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(&dir, "empty.csv", "\n\n");
    let err = read_registry_table(&path, None).unwrap_err();
    assert!(matches!(err, IngestError::EmptyCsv { .. }));
}

#[test]
fn missing_file_is_read_error() {
    let err = read_registry_table(Path::new("/nonexistent/extract.csv"), None).unwrap_err();
    assert!(matches!(err, IngestError::FileRead { .. }));
}
