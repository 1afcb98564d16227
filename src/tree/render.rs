//! Plain-text rendering of a [`TableView`] for terminals.

use std::fmt::Write;

use crate::tree::table::{TableBody, TableView};

pub const LOADING_TEXT: &str = "Đang tải...";

const INDENT: &str = "    ";

/// Render a table and its expanded subtrees as indented text.
pub fn render_text(view: &TableView) -> String {
    let mut out = String::new();
    write_table(&mut out, view, 0);
    out
}

fn write_table(out: &mut String, view: &TableView, depth: usize) {
    let pad = INDENT.repeat(depth);

    match &view.body {
        TableBody::Loading => {
            let _ = writeln!(out, "{}{}", pad, LOADING_TEXT);
        }
        TableBody::Empty(message) => {
            let _ = writeln!(out, "{}{}", pad, message);
        }
        TableBody::Rows(rows) => {
            let widths = column_widths(view);
            let _ = writeln!(out, "{}    {}", pad, format_cells(&view.headers, &widths));

            for row in rows {
                let marker = match &row.expander {
                    Some(e) if e.expanded => "[-]",
                    Some(_) => "[+]",
                    None => "   ",
                };
                let _ = writeln!(out, "{}{} {}", pad, marker, format_cells(&row.cells, &widths));

                if let Some(child) = &row.child {
                    write_table(out, &child.table, depth + 1);
                }
            }
        }
    }
}

fn column_widths(view: &TableView) -> Vec<usize> {
    let mut widths: Vec<usize> = view.headers.iter().map(|h| h.chars().count()).collect();
    for row in view.rows() {
        for (i, cell) in row.cells.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    widths
}

fn format_cells(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
