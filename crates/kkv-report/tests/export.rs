//! Export tests: augmented CSVs and the JSON report.

use std::fs;

use kkv_gazetteer::GazetteerIndex;
use kkv_ingest::RegistryTable;
use kkv_match::ReconcileStats;
use kkv_model::{
    AdminLevel, FieldChecks, GazetteerEntry, MatchKind, PlaceValidation, RecordField, RecordIssue,
    ValidatedRecord,
};
use kkv_report::{
    INVALID_FILE, PlaceReport, REPORT_FILE, RowFilter, VALIDATED_FILE, ValidationReport,
    ValidationSummary, export_places, export_records, write_places_csv, write_records_csv,
};
use tempfile::TempDir;

fn table() -> RegistryTable {
    RegistryTable {
        headers: vec!["NIK".to_string(), "TEMPAT_LAHIR".to_string()],
        rows: vec![
            vec!["1".to_string(), "Bandung".to_string()],
            vec!["2".to_string(), "Atlantis".to_string()],
            vec!["3".to_string(), String::new()],
        ],
    }
}

fn places() -> Vec<PlaceValidation> {
    vec![
        PlaceValidation {
            place_raw: Some("Bandung".to_string()),
            place_normalized: Some("BANDUNG".to_string()),
            is_valid: true,
            corrected_name: Some("Kota Bandung".to_string()),
            admin_level: Some(AdminLevel::Regency),
            confidence_score: 100.0,
            match_kind: MatchKind::Exact,
        },
        PlaceValidation {
            place_raw: Some("Atlantis".to_string()),
            place_normalized: Some("ATLANTIS".to_string()),
            is_valid: false,
            corrected_name: None,
            admin_level: None,
            confidence_score: 40.0,
            match_kind: MatchKind::NoMatch,
        },
        PlaceValidation::missing(None, None),
    ]
}

fn records() -> Vec<ValidatedRecord> {
    let all_ok = FieldChecks {
        kk_no: true,
        nik: true,
        name: true,
        gender: true,
        date_of_birth: true,
    };
    places()
        .into_iter()
        .enumerate()
        .map(|(index, place)| {
            let mut checks = all_ok;
            let mut issues = Vec::new();
            if index == 2 {
                checks.nik = false;
                issues.push(RecordIssue::WrongLength {
                    field: RecordField::Nik,
                    length: 1,
                });
            }
            match place.match_kind {
                MatchKind::NoMatch => issues.push(RecordIssue::PlaceNotFound {
                    value: "Atlantis".to_string(),
                }),
                MatchKind::Missing => issues.push(RecordIssue::Empty {
                    field: RecordField::PlaceOfBirth,
                }),
                _ => {}
            }
            ValidatedRecord {
                index,
                checks,
                place,
                issues,
            }
        })
        .collect()
}

fn report() -> ValidationReport {
    let index = GazetteerIndex::from_entries(vec![GazetteerEntry {
        canonical_name: "Kota Bandung".to_string(),
        normalized_name: "BANDUNG".to_string(),
        level: AdminLevel::Regency,
    }]);
    let places = places();
    ValidationReport::new(
        index.summary(),
        85,
        ReconcileStats::default(),
        PlaceReport::build(&places),
    )
    .with_input("registry.csv")
}

fn utf8(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap()
}

#[test]
fn places_csv_appends_result_columns() {
    let mut out = Vec::new();
    let written = write_places_csv(&mut out, &table(), &places(), false).unwrap();
    assert_eq!(written, 3);
    insta::assert_snapshot!(utf8(out).trim_end(), @r"
    NIK,TEMPAT_LAHIR,valid_tempat_lahir,place_normalized,place_corrected,place_level,place_confidence,place_match_kind
    1,Bandung,true,BANDUNG,Kota Bandung,regency,100.00,exact
    2,Atlantis,false,ATLANTIS,,,40.00,no_match
    3,,false,,,,0.00,missing
    ");
}

#[test]
fn invalid_places_only() {
    let mut out = Vec::new();
    let written = write_places_csv(&mut out, &table(), &places(), true).unwrap();
    assert_eq!(written, 2);
    let text = utf8(out);
    assert!(!text.contains("Kota Bandung"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn record_rows_carry_notes() {
    let mut out = Vec::new();
    let written =
        write_records_csv(&mut out, &table(), &records(), RowFilter::Invalid(&[])).unwrap();
    assert_eq!(written, 2);
    let text = utf8(out);
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].ends_with("all_valid,validation_notes"));
    assert!(lines[1].starts_with("2,Atlantis,true,true,true,true,false,true,ATLANTIS"));
    assert!(lines[1].ends_with("false,TEMPAT_LAHIR 'Atlantis' not found in gazetteer"));
    assert!(
        lines[2].ends_with(r#"false,"NIK has 1 digits, expected 16; TEMPAT_LAHIR is empty""#),
        "{}",
        lines[2]
    );

    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());
    let notes: Vec<String> = reader
        .records()
        .map(|row| {
            let row = row.unwrap();
            row[row.len() - 1].to_string()
        })
        .collect();
    assert_eq!(
        notes,
        [
            "TEMPAT_LAHIR 'Atlantis' not found in gazetteer",
            "NIK has 1 digits, expected 16; TEMPAT_LAHIR is empty",
        ]
    );
}

#[test]
fn failed_field_filter_narrows_rows() {
    let mut out = Vec::new();
    let written = write_records_csv(
        &mut out,
        &table(),
        &records(),
        RowFilter::Invalid(&[RecordField::Nik]),
    )
    .unwrap();
    assert_eq!(written, 1);
    assert!(utf8(out).lines().nth(1).unwrap().starts_with("3,,"));
}

#[test]
fn export_records_writes_three_files() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("output");
    let records = records();
    let report = report().with_summary(ValidationSummary::from_records(&records));

    let summary = export_records(&out_dir, &table(), &records, &[], &report).unwrap();

    assert_eq!(summary.validated_rows, 3);
    assert_eq!(summary.invalid_rows, 2);
    assert_eq!(summary.paths.validated, out_dir.join(VALIDATED_FILE));
    assert!(summary.paths.invalid.ends_with(INVALID_FILE));

    let json = fs::read_to_string(out_dir.join(REPORT_FILE)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["threshold"], 85);
    assert_eq!(parsed["input"], "registry.csv");
    assert_eq!(parsed["summary"]["total"], 3);
    assert_eq!(parsed["places"]["invalid"], 2);
    assert_eq!(parsed["gazetteer"]["distinct_keys"], 1);
}

#[test]
fn place_only_report_has_no_summary() {
    let dir = TempDir::new().unwrap();
    let summary = export_places(dir.path(), &table(), &places(), &report()).unwrap();
    assert_eq!(summary.validated_rows, 3);
    assert_eq!(summary.invalid_rows, 2);

    let json = fs::read_to_string(&summary.paths.report).unwrap();
    let parsed: ValidationReport = serde_json::from_str(&json).unwrap();
    assert!(parsed.summary.is_none());
    assert_eq!(parsed.places.valid, 1);
    assert_eq!(parsed.places.corrections.len(), 0);
}
