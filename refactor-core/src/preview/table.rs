use super::display_path;
use crate::batch::BatchReport;
use crate::classifier::classify;
use crate::locator::Occurrence;
use crate::planner::{BatchPlan, RenameMapping};
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use std::io::{self, IsTerminal};

fn new_table(headers: &[&str], use_color: bool) -> Table {
    let mut table = Table::new();

    if io::stdout().is_terminal() {
        table.set_content_arrangement(ContentArrangement::Dynamic);
    } else {
        table.set_content_arrangement(ContentArrangement::Disabled);
    }

    // Force styling even in non-TTY environments when colors are explicitly requested
    if use_color {
        table.enforce_styling();
        table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    } else {
        table.set_header(headers.iter().copied());
    }
    table
}

fn count_cell(count: usize) -> Cell {
    Cell::new(count).set_alignment(CellAlignment::Right)
}

/// One row per occurrence with its role.
pub fn render_occurrences(occurrences: &[Occurrence], use_color: bool) -> String {
    let mut table = new_table(&["File", "Line", "Col", "Role"], use_color);
    for occurrence in occurrences {
        table.add_row(vec![
            Cell::new(display_path(&occurrence.location.file)),
            count_cell(occurrence.line()),
            count_cell(occurrence.column() + 1),
            Cell::new(classify(occurrence)),
        ]);
    }
    table.to_string()
}

/// Per-mapping net effect of a batch, with a totals row.
pub fn render_batch(report: &BatchReport, use_color: bool) -> String {
    let mut table = new_table(&["#", "Old", "New", "Changes", "Files"], use_color);
    for (index, mapping) in report.mapping.iter().enumerate() {
        table.add_row(vec![
            count_cell(index + 1),
            Cell::new(&mapping.old),
            Cell::new(&mapping.new),
            count_cell(mapping.changes),
            count_cell(mapping.files_touched.len()),
        ]);
    }

    let totals = |text: String| {
        let cell = Cell::new(text);
        if use_color {
            cell.fg(Color::Yellow)
        } else {
            cell
        }
    };
    table.add_row(vec![
        totals(String::new()),
        totals("TOTALS".to_string()),
        totals(String::new()),
        totals(report.total_changes.to_string()),
        totals(report.total_files.to_string()),
    ]);
    table.to_string()
}

/// The execution order of a batch plan.
pub fn render_steps(plan: &BatchPlan, mappings: &[RenameMapping], use_color: bool) -> String {
    let mut table = new_table(&["Step", "Old", "New", "Mapping", "Kind"], use_color);
    for (index, step) in plan.steps.iter().enumerate() {
        let kind = match plan.cycle_of(step.origin_mapping_index) {
            Some(cycle) if step.is_temp => format!("cycle {}", cycle + 1),
            _ => "direct".to_string(),
        };
        let kind = if use_color && step.is_temp {
            Cell::new(kind).fg(Color::Magenta)
        } else {
            Cell::new(kind)
        };
        table.add_row(vec![
            count_cell(index + 1),
            Cell::new(&step.old),
            Cell::new(&step.new),
            Cell::new(&mappings[step.origin_mapping_index]),
            kind,
        ]);
    }
    table.to_string()
}
