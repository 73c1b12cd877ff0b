use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use roi_model::{Finding, Severity};

use crate::types::AuditRun;

pub fn print_summary(run: &AuditRun) {
    println!("Folder: {}", run.folder.display());
    println!("Standards release: {}", run.standards_release);
    println!("Tables: {}  Rules: {}", run.tables, run.rules);
    if run.unreadable > 0 {
        eprintln!("Unreadable tables: {} (reported as FATAL)", run.unreadable);
    }
    for path in &run.outputs {
        println!("Report: {}", path.display());
    }
    println!("{}", module_table(run));
    if let Some(table) = finding_table(&run.report.findings) {
        println!();
        println!("Findings:");
        println!("{table}");
    }
}

/// Per-module counts with a totals row.
pub fn module_table(run: &AuditRun) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Description"),
        header_cell("Fatal"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Info"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let summary = &run.report.summary;
    for (module, counts) in &summary.by_module {
        let description = run
            .descriptions
            .get(module)
            .map_or_else(|| dim_cell("not in release"), Cell::new);
        table.add_row(vec![
            Cell::new(module)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            description,
            count_cell(counts.fatal, Severity::Fatal),
            count_cell(counts.error, Severity::Error),
            count_cell(counts.warning, Severity::Warning),
            count_cell(counts.info, Severity::Info),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("All modules")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        count_cell(summary.count(Severity::Fatal), Severity::Fatal).add_attribute(Attribute::Bold),
        count_cell(summary.count(Severity::Error), Severity::Error).add_attribute(Attribute::Bold),
        count_cell(summary.count(Severity::Warning), Severity::Warning)
            .add_attribute(Attribute::Bold),
        count_cell(summary.count(Severity::Info), Severity::Info).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Findings ordered by severity, discovery order within a severity.
pub fn finding_table(findings: &[Finding]) -> Option<Table> {
    if findings.is_empty() {
        return None;
    }
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by_key(|finding| finding.severity);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Module"),
        header_cell("Row"),
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Message"),
    ]);
    apply_finding_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for finding in ordered {
        table.add_row(vec![
            severity_cell(finding.severity),
            Cell::new(&finding.module),
            Cell::new(finding.row),
            Cell::new(&finding.column),
            Cell::new(finding.category),
            Cell::new(&finding.message),
        ]);
    }
    Some(table)
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
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
        ]);
    }
}

fn apply_finding_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Fixed(8)),
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Fixed(13)),
            ColumnConstraint::UpperBoundary(Width::Percentage(60)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Fatal | Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Info => Color::Blue,
    }
}

fn severity_cell(severity: Severity) -> Cell {
    let cell = Cell::new(severity).fg(severity_color(severity));
    if severity == Severity::Fatal {
        cell.add_attribute(Attribute::Bold)
    } else {
        cell
    }
}

fn count_cell(count: usize, severity: Severity) -> Cell {
    if count > 0 {
        Cell::new(count)
            .fg(severity_color(severity))
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
