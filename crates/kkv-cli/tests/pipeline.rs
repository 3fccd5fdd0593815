//! Integration tests for the pipeline stages.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use kkv_cli::pipeline::{
    default_output_dir, ingest, load_index, resolve_gazetteer_path, run_places, run_validation,
    write_places_outputs, write_validation_outputs,
};
use kkv_ingest::{ALL_FIELDS, PLACE_ONLY};
use kkv_match::ReconcileOptions;
use kkv_model::{MatchKind, RecordField};
use kkv_validate::ValidationOptions;
use tempfile::TempDir;

const BOUNDARIES: &str = "\
NAMOBJ,WADMKD,WADMKC,WADMKK,WADMPR
3171011001,Gambir,Gambir,Kota Jakarta Pusat,DKI Jakarta
3273011001,Sukamaju,Cibeunying Kidul,Kota Bandung,Jawa Barat
";

const REGISTRY: &str = "\
KK_NO;NIK;CUSTNAME;JENIS_KELAMIN;TEMPAT_LAHIR;TANGGAL_LAHIR
3273010101900001;3273015507900002;SITI AMINAH;PEREMPUAN;Kab. Bandung;1990-07-15
3273010101900001;3273011507900003;BUDI;LAKI-LAKI;Jakrta;15/07/1988
3273010101900000;12345;AGUS 2;PRIA;Atlantis;2030-01-01
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn options() -> ValidationOptions {
    ValidationOptions::new()
        .with_reconcile(ReconcileOptions::new().with_parallel(false))
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
}

#[test]
fn validate_end_to_end() {
    let dir = TempDir::new().unwrap();
    let gazetteer = write(dir.path(), "boundaries.csv", BOUNDARIES);
    let input = write(dir.path(), "registry.csv", REGISTRY);

    let index = load_index(&gazetteer, None).unwrap();
    let ingested = ingest(&input, None, ALL_FIELDS).unwrap();
    assert_eq!(ingested.records.len(), 3);

    let seen = Mutex::new(Vec::new());
    let outcome = run_validation(&ingested, &index, &options(), |fraction| {
        seen.lock().unwrap().push(fraction);
    })
    .unwrap();

    assert!(outcome.records[0].all_valid());
    assert!(outcome.records[1].all_valid());
    assert_eq!(outcome.records[1].place.match_kind, MatchKind::Approximate);
    assert!(!outcome.records[2].all_valid());
    assert_eq!(outcome.records[2].issues.len(), 6);
    assert_eq!(seen.into_inner().unwrap().last().copied(), Some(1.0));

    let summary = outcome.report.summary.as_ref().unwrap();
    assert_eq!(summary.all_valid, 2);
    assert_eq!(outcome.report.places.corrections.len(), 1);

    let out_dir = default_output_dir(&input);
    assert_eq!(out_dir, dir.path().join("output"));
    let exports = write_validation_outputs(&out_dir, &ingested, &outcome, &[]).unwrap();
    assert_eq!(exports.validated_rows, 3);
    assert_eq!(exports.invalid_rows, 1);

    let validated = fs::read_to_string(&exports.paths.validated).unwrap();
    let header = validated.lines().next().unwrap();
    assert!(header.starts_with("KK_NO,NIK,CUSTNAME"));
    assert!(header.ends_with("all_valid,validation_notes"));
    assert!(validated.contains("DKI Jakarta"));
}

#[test]
fn failed_field_filter_limits_invalid_rows() {
    let dir = TempDir::new().unwrap();
    let gazetteer = write(dir.path(), "boundaries.csv", BOUNDARIES);
    let input = write(
        dir.path(),
        "registry.csv",
        "KK_NO,NIK,CUSTNAME,JENIS_KELAMIN,TEMPAT_LAHIR,TANGGAL_LAHIR\n\
         3273010101900001,3273015507900002,SITI,PEREMPUAN,Atlantis,1990-07-15\n\
         3273010101900001,123,BUDI,LAKI-LAKI,Bandung,1990-07-15\n",
    );
    let index = load_index(&gazetteer, None).unwrap();
    let ingested = ingest(&input, Some(b','), ALL_FIELDS).unwrap();
    let outcome = run_validation(&ingested, &index, &options(), |_| {}).unwrap();

    let out_dir = dir.path().join("custom");
    let exports =
        write_validation_outputs(&out_dir, &ingested, &outcome, &[RecordField::Nik]).unwrap();
    assert_eq!(exports.invalid_rows, 1);
    let invalid = fs::read_to_string(out_dir.join("invalid.csv")).unwrap();
    assert!(invalid.contains("BUDI"));
    assert!(!invalid.contains("SITI"));
}

#[test]
fn places_only_needs_just_the_place_column() {
    let dir = TempDir::new().unwrap();
    let gazetteer = write(dir.path(), "boundaries.csv", BOUNDARIES);
    let input = write(dir.path(), "places.csv", "ID,TEMPAT_LAHIR\n1,Gambir\n2,\n3,Jakrta\n");

    let index = load_index(&gazetteer, None).unwrap();
    assert!(ingest(&input, None, ALL_FIELDS).is_err());
    let ingested = ingest(&input, None, PLACE_ONLY).unwrap();
    let outcome = run_places(
        &ingested,
        &index,
        ReconcileOptions::new().with_threshold(90),
        |_| {},
    )
    .unwrap();

    let kinds: Vec<MatchKind> = outcome.places.iter().map(|p| p.match_kind).collect();
    assert_eq!(
        kinds,
        vec![MatchKind::Exact, MatchKind::Missing, MatchKind::Approximate]
    );
    assert_eq!(outcome.report.threshold, 90);
    assert!(outcome.report.summary.is_none());

    let exports = write_places_outputs(&dir.path().join("out"), &ingested, &outcome).unwrap();
    assert_eq!(exports.invalid_rows, 1);
    let invalid = fs::read_to_string(&exports.paths.invalid).unwrap();
    assert!(invalid.starts_with("ID,TEMPAT_LAHIR,valid_tempat_lahir"));
    assert!(invalid.contains("2,,false"));
}

#[test]
fn missing_gazetteer_is_reported_with_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");
    let error = load_index(&missing, None).unwrap_err();
    assert!(format!("{error:#}").contains("nope.csv"));
}

#[test]
fn explicit_gazetteer_path_wins() {
    let explicit = Path::new("/tmp/boundaries.csv");
    assert_eq!(resolve_gazetteer_path(Some(explicit)), explicit);
}

#[test]
fn output_dir_for_bare_file_name() {
    assert_eq!(default_output_dir(Path::new("registry.csv")), Path::new("./output"));
}
