use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use pri_cli::types::RunResult;
use pri_model::{Diagnostic, Severity};

pub fn print_summary(result: &RunResult) {
    println!("Input: {}", result.input.display());
    println!("Output: {}", result.output_dir.display());
    println!("Diagnostics report: {}", result.diagnostics_path.display());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for summary in &result.tables {
        let file = summary
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(summary.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(file),
            Cell::new(summary.rows),
            Cell::new(summary.columns),
        ]);
    }
    println!("{table}");

    let mut totals = Table::new();
    totals.set_header(vec![
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Corrected rows"),
    ]);
    apply_table_style(&mut totals);
    totals.add_row(vec![
        count_cell(result.diagnostics.error_count(), Color::Red),
        count_cell(result.diagnostics.warning_count(), Color::Yellow),
        Cell::new(result.cleanup.total_changed()),
    ]);
    println!("{totals}");
    print_diagnostic_table(result);
}

struct KindRow<'a> {
    severity: Severity,
    count: usize,
    example: &'a Diagnostic,
}

fn print_diagnostic_table(result: &RunResult) {
    let mut kinds: BTreeMap<&'static str, KindRow<'_>> = BTreeMap::new();
    for diagnostic in result.diagnostics.iter() {
        kinds
            .entry(diagnostic.kind())
            .and_modify(|row| row.count += 1)
            .or_insert(KindRow {
                severity: diagnostic.severity(),
                count: 1,
                example: diagnostic,
            });
    }
    if kinds.is_empty() {
        return;
    }
    let mut rows: Vec<(&'static str, KindRow<'_>)> = kinds.into_iter().collect();
    rows.sort_by_key(|(kind, row)| (severity_rank(row.severity), *kind));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Severity"),
        header_cell("Count"),
        header_cell("Example"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for (kind, row) in rows {
        table.add_row(vec![
            Cell::new(kind),
            severity_cell(row.severity),
            Cell::new(row.count).fg(severity_color(row.severity)),
            Cell::new(row.example.message()),
        ]);
    }
    println!();
    println!("Diagnostics:");
    println!("{table}");
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(26)),
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::UpperBoundary(Width::Percentage(70)),
        ]);
    }
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 0,
        Severity::Warning => 1,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
