use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use kkv_gazetteer::GazetteerSummary;
use kkv_model::{AdminLevel, MatchKind};
use kkv_report::{PlaceReport, ValidationSummary};

use crate::types::{RunKind, RunResult};

pub fn print_run(result: &RunResult) {
    let report = &result.report;
    println!("Input: {}", result.input.display());
    print_gazetteer_source(&report.gazetteer);
    println!("Threshold: {}", report.threshold);
    println!(
        "Reconciled {} rows ({} distinct values needed fuzzy matching) in {} ms",
        report.reconciliation.rows,
        report.reconciliation.distinct_queries,
        report.reconciliation.duration_ms
    );
    if report.reconciliation.failed_rows > 0 {
        eprintln!(
            "warning: {} rows could not be scored and were marked invalid",
            report.reconciliation.failed_rows
        );
    }

    if result.kind == RunKind::Validate
        && let Some(summary) = &report.summary
    {
        println!();
        println!("{}", field_table(summary));
    }
    print_place_report(&report.places);

    match &result.exports {
        Some(exports) => {
            println!();
            println!(
                "Validated: {} ({} rows)",
                exports.paths.validated.display(),
                exports.validated_rows
            );
            println!(
                "Invalid: {} ({} rows)",
                exports.paths.invalid.display(),
                exports.invalid_rows
            );
            println!("Report: {}", exports.paths.report.display());
        }
        None => {
            println!();
            println!("Dry run: no files written.");
        }
    }
}

pub fn print_gazetteer(summary: &GazetteerSummary) {
    print_gazetteer_source(summary);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Level"), header_cell("Distinct keys")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for level in AdminLevel::ALL {
        let count = summary.levels.get(&level).copied().unwrap_or(0);
        table.add_row(vec![Cell::new(level.label()), count_cell(count, Color::Reset)]);
    }
    table.add_row(vec![
        header_cell("TOTAL"),
        Cell::new(summary.distinct_keys).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!("Entries: {}", summary.entries);
    println!("Collisions: {}", summary.collisions);
}

fn print_gazetteer_source(summary: &GazetteerSummary) {
    if let Some(source) = &summary.source {
        println!("Gazetteer: {source}");
    }
    if let Some(fingerprint) = &summary.fingerprint {
        println!("SHA-256: {fingerprint}");
    }
}

fn field_table(summary: &ValidationSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Column"),
        header_cell("Valid"),
        header_cell("Valid %"),
        header_cell("Invalid"),
        header_cell("Invalid %"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for field in &summary.fields {
        table.add_row(vec![
            Cell::new(field.field.label()),
            dim_cell(&field.column),
            Cell::new(field.valid),
            Cell::new(pct(field.valid_pct)),
            count_cell(field.invalid, Color::Red),
            pct_cell(field.invalid_pct, field.invalid),
        ]);
    }
    table.add_row(vec![
        header_cell("ALL FIELDS"),
        dim_cell("-"),
        Cell::new(summary.all_valid).add_attribute(Attribute::Bold),
        Cell::new(pct(summary.all_valid_pct)).add_attribute(Attribute::Bold),
        count_cell(summary.any_invalid, Color::Red).add_attribute(Attribute::Bold),
        pct_cell(summary.any_invalid_pct, summary.any_invalid).add_attribute(Attribute::Bold),
    ]);
    table
}

fn print_place_report(report: &PlaceReport) {
    println!();
    println!(
        "Places: {} valid ({}), {} invalid ({}) of {}",
        report.valid,
        pct(report.valid_pct),
        report.invalid,
        pct(report.invalid_pct),
        report.total
    );

    let mut levels = Table::new();
    levels.set_header(vec![
        header_cell("Matched level"),
        header_cell("Rows"),
        header_cell("Share"),
    ]);
    apply_table_style(&mut levels);
    align_column(&mut levels, 1, CellAlignment::Right);
    align_column(&mut levels, 2, CellAlignment::Right);
    for share in &report.levels {
        levels.add_row(vec![
            Cell::new(share.level.label()),
            Cell::new(share.count),
            Cell::new(pct(share.share_pct)),
        ]);
    }
    println!("{levels}");

    let mut confidence = Table::new();
    confidence.set_header(vec![header_cell("Confidence"), header_cell("Rows")]);
    apply_table_style(&mut confidence);
    align_column(&mut confidence, 1, CellAlignment::Right);
    for bin in &report.confidence {
        confidence.add_row(vec![Cell::new(&bin.label), count_cell(bin.count, Color::Reset)]);
    }
    println!("{confidence}");

    if !report.corrections.is_empty() {
        let mut corrections = Table::new();
        corrections.set_header(vec![
            header_cell("Input"),
            header_cell("Corrected to"),
            header_cell("Level"),
            header_cell("Rows"),
        ]);
        apply_table_style(&mut corrections);
        align_column(&mut corrections, 3, CellAlignment::Right);
        for correction in &report.corrections {
            corrections.add_row(vec![
                Cell::new(&correction.original),
                Cell::new(&correction.corrected).fg(Color::Green),
                Cell::new(correction.level.label()),
                Cell::new(correction.count),
            ]);
        }
        println!();
        println!("Corrections:");
        println!("{corrections}");
    }

    if !report.invalid_samples.is_empty() {
        let mut samples = Table::new();
        samples.set_header(vec![
            header_cell("Row"),
            header_cell("TEMPAT_LAHIR"),
            header_cell("Normalized"),
            header_cell("Score"),
            header_cell("Result"),
        ]);
        apply_table_style(&mut samples);
        align_column(&mut samples, 0, CellAlignment::Right);
        align_column(&mut samples, 3, CellAlignment::Right);
        for sample in &report.invalid_samples {
            samples.add_row(vec![
                Cell::new(sample.row + 1),
                optional_cell(sample.place_raw.as_deref()),
                optional_cell(sample.place_normalized.as_deref()),
                Cell::new(format!("{:.1}", sample.confidence_score)),
                kind_cell(sample.match_kind),
            ]);
        }
        println!();
        println!("Invalid samples:");
        println!("{samples}");
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn pct(value: f64) -> String {
    format!("{value:.1}%")
}

fn pct_cell(value: f64, count: usize) -> Cell {
    if count > 0 {
        Cell::new(pct(value)).fg(Color::Red)
    } else {
        dim_cell(pct(value))
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn kind_cell(kind: MatchKind) -> Cell {
    match kind {
        MatchKind::Failed => Cell::new(kind.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        MatchKind::NoMatch => Cell::new(kind.as_str()).fg(Color::Yellow),
        _ => dim_cell(kind.as_str()),
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
