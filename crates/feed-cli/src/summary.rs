//! Terminal rendering of run summaries and registrations.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::pipeline::{RunSummary, StageRow};

/// Renders the stage table, the filter log and the output line.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Before"),
        header_cell("After"),
        header_cell("Excluded"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    table.add_row(vec![
        dim_cell("input"),
        dim_cell("-"),
        Cell::new(summary.input_rows),
        dim_cell("-"),
    ]);
    for stage in &summary.stages {
        table.add_row(vec![
            stage_cell(stage),
            Cell::new(stage.before),
            Cell::new(stage.after),
            excluded_cell(stage),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.input_rows).add_attribute(Attribute::Bold),
        Cell::new(summary.output_rows).add_attribute(Attribute::Bold),
        count_cell(summary.input_rows.saturating_sub(summary.output_rows))
            .add_attribute(Attribute::Bold),
    ]);

    let mut lines = vec![format!("Output: {}", summary.label), table.to_string()];
    if !summary.report_lines.is_empty() {
        lines.push("Filter log:".to_string());
        lines.extend(summary.report_lines.iter().map(|line| format!("  {line}")));
    }
    if summary.written {
        lines.push(format!(
            "Wrote {} rows x {} columns to {}",
            summary.output_rows,
            summary.output_columns,
            summary.output_path.display()
        ));
    } else {
        lines.push(format!(
            "Dry run: {} not written",
            summary.output_path.display()
        ));
    }
    lines.join("\n")
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", render_summary(summary));
}

/// Prints the registrations as one row per entity and role.
pub fn print_registrations(filters: &[String], mappers: &[String]) {
    let mut all: Vec<&String> = filters.iter().chain(mappers).collect();
    all.sort();
    all.dedup();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Role"),
        header_cell("Filter"),
        header_cell("Mapper"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Center);
    for registration in all {
        let (entity, role) = registration
            .split_once('/')
            .unwrap_or((registration.as_str(), ""));
        table.add_row(vec![
            Cell::new(entity).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(role),
            presence_cell(filters.contains(registration)),
            presence_cell(mappers.contains(registration)),
        ]);
    }
    println!("{table}");
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

fn stage_cell(stage: &StageRow) -> Cell {
    if stage.applied {
        Cell::new(&stage.label)
    } else {
        Cell::new(format!("{} (skipped)", stage.label)).fg(Color::DarkGrey)
    }
}

fn excluded_cell(stage: &StageRow) -> Cell {
    if stage.applied {
        count_cell(stage.excluded())
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Yellow).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn presence_cell(present: bool) -> Cell {
    if present {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
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
