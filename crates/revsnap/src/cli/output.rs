//! Output formatting utilities for CLI commands
//!
//! Provides consistent formatting for:
//! - Tables with column alignment
//! - Counters with thousands separators
//! - Signed two-decimal figures for pickup deltas
//! - Colors for terminal output

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use revsnap_core::{Direction, SnapshotStatus};

/// Format an integer with thousands separators
///
/// Examples:
/// - 500 -> "500"
/// - 12345 -> "12,345"
/// - -12345 -> "-12,345"
pub fn format_number(n: i64) -> String {
    let grouped = group_digits(&n.unsigned_abs().to_string());
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Like [`format_number`], with an explicit sign on positive values
pub fn format_number_signed(n: i64) -> String {
    if n > 0 {
        format!("+{}", format_number(n))
    } else {
        format_number(n)
    }
}

/// Format a figure with two decimals and thousands separators
///
/// Examples:
/// - 1234.5 -> "1,234.50"
/// - -0.004 -> "0.00"
pub fn format_figure(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as i64;
    let grouped = group_digits(&(cents / 100).to_string());
    let formatted = format!("{}.{:02}", grouped, cents % 100);
    if value < 0.0 && cents != 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Signed variant of [`format_figure`] for pickup deltas; a flat zero
/// stays unsigned
pub fn format_figure_signed(value: f64) -> String {
    let formatted = format_figure(value);
    if formatted.starts_with('-') || formatted == "0.00" {
        formatted
    } else {
        format!("+{formatted}")
    }
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Display color for a snapshot lifecycle state
pub fn status_color(status: SnapshotStatus) -> Color {
    match status {
        SnapshotStatus::Pending => Color::Yellow,
        SnapshotStatus::Processing => Color::Cyan,
        SnapshotStatus::Completed => Color::Green,
        SnapshotStatus::Failed => Color::Red,
    }
}

/// Display color for a pickup direction; flat deltas stay uncolored
pub fn direction_color(direction: Direction) -> Option<Color> {
    match direction {
        Direction::Up => Some(Color::Green),
        Direction::Down => Some(Color::Red),
        Direction::Flat => None,
    }
}

/// Print a table with headers and rows
pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        table.add_row(row);
    }

    println!("{}", table);
}

/// Print a table with custom per-cell colors
pub fn print_table_colored(headers: &[&str], rows: Vec<Vec<(String, Option<Color>)>>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| Cell::new(h).fg(Color::Cyan))
        .collect();
    table.set_header(header_cells);

    for row in rows {
        let cells: Vec<Cell> = row
            .into_iter()
            .map(|(text, color)| {
                let cell = Cell::new(text);
                if let Some(c) = color {
                    cell.fg(c)
                } else {
                    cell
                }
            })
            .collect();
        table.add_row(cells);
    }

    println!("{}", table);
}
