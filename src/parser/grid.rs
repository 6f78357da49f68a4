//! Row-major cell grids and their conversion to and from rows.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::{Row, Value};

/// A row-major grid of raw cell strings.
pub type Grid = Vec<Vec<String>>;

fn separator_cell_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^:?-{3,}:?$").expect("valid regex"))
}

fn line_break_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"))
}

/// Parse a pipe-delimited markdown table into a grid.
///
/// Outer pipes are stripped, cells are trimmed and NFC-normalized, `<br>`
/// becomes a newline, and `|---|---|` separator rows are skipped. Rows keep
/// their own length; ragged input stays ragged.
pub fn parse_markdown_grid(body: &str) -> Grid {
    body.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(split_cells)
        .filter(|cells| !is_separator_row(cells))
        .collect()
}

fn split_cells(line: &str) -> Vec<String> {
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(clean_cell).collect()
}

fn clean_cell(cell: &str) -> String {
    let text = line_break_pattern().replace_all(cell, "\n");
    text.trim().nfc().collect()
}

fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|c| separator_cell_pattern().is_match(c))
}

/// Check if every row has the same number of cells.
pub fn is_rectangular(grid: &[Vec<String>]) -> bool {
    grid.first()
        .map_or(true, |first| grid.iter().all(|r| r.len() == first.len()))
}

/// Make header names unique by suffixing repeats with `_2`, `_3`, ...
fn unique_names(header: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut names = Vec::with_capacity(header.len());
    for name in header {
        let count = seen.entry(name.as_str()).or_insert(0);
        *count += 1;
        if *count == 1 {
            names.push(name.clone());
        } else {
            names.push(format!("{}_{}", name, count));
        }
    }
    names
}

/// Convert a grid to rows, using the first grid row as the header.
///
/// Short rows are padded with empty strings and long rows truncated, so every
/// produced row has exactly the header's field names. A header-only grid
/// yields one blank anchor row (see [`Row::anchor`]). An empty grid yields
/// no rows.
pub fn grid_to_rows(grid: &[Vec<String>]) -> Vec<Row> {
    let Some((header, body)) = grid.split_first() else {
        return Vec::new();
    };
    let names = unique_names(header);

    if body.is_empty() {
        return vec![Row::anchor(&names)];
    }

    body.iter()
        .map(|cells| {
            let mut row = Row::new();
            for (i, name) in names.iter().enumerate() {
                let cell = cells.get(i).cloned().unwrap_or_default();
                row.insert(name.clone(), Value::String(cell));
            }
            row
        })
        .collect()
}

/// Convert rows back to a grid: header first, then one grid row per row.
///
/// The header is the first row's field names; `inner` tables are not part
/// of the grid. Non-string values are rendered with their display form. A
/// lone anchor row gives back a header-only grid.
pub fn rows_to_grid(rows: &[Row]) -> Grid {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let header: Vec<String> = first.field_names().map(str::to_string).collect();
    if matches!(rows, [only] if only.is_anchor()) {
        return vec![header];
    }

    let mut grid = Vec::with_capacity(rows.len() + 1);
    grid.push(header.clone());
    for row in rows {
        grid.push(
            header
                .iter()
                .map(|name| row.get(name).map(|v| v.to_string()).unwrap_or_default())
                .collect(),
        );
    }
    grid
}
