//! Table classification.
//!
//! Every marked table is classified into one of three shapes, first match wins:
//! [`Shape::HeaderValue`], [`Shape::Nested`], then [`Shape::MetaHeader`] as the
//! default.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{BBox, Row, Shape, TableSection, Value};

use super::grid::{grid_to_rows, is_rectangular, Grid};
use super::nested::{detect_nested, NestedTableResolver};
use super::options::ReconstructOptions;
use super::oracle::{LayoutOracle, PageView};

fn money_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[$€£]?\s*(\d[\d,]*(?:\.\d+)?)$").expect("valid regex"))
}

/// A classified table and what it cost to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    /// Reconstructed table
    pub table: TableSection,
    /// The nested resolver had to fall back to the grid heuristic
    pub degraded: bool,
    /// Ragged body rows dropped in lenient mode
    pub dropped_rows: usize,
}

impl Classified {
    fn clean(table: TableSection) -> Self {
        Self {
            table,
            degraded: false,
            dropped_rows: 0,
        }
    }
}

/// Classifies raw table grids and reconstructs their payload.
pub struct TableClassifier<'o> {
    options: &'o ReconstructOptions,
}

impl<'o> TableClassifier<'o> {
    /// Create a classifier.
    pub fn new(options: &'o ReconstructOptions) -> Self {
        Self { options }
    }

    /// Classify a grid found at `bbox` on `page`.
    pub fn classify<O: LayoutOracle>(
        &self,
        grid: Grid,
        bbox: BBox,
        page: &PageView<'_, O>,
    ) -> Result<Classified> {
        if grid.is_empty() {
            return Err(Error::StructuralAmbiguity(format!(
                "table on page {} has no rows",
                page.index()
            )));
        }

        if is_header_value(&grid, &self.options.total_marker) {
            log::debug!("TableClassifier: page {}: header_value", page.index());
            let table = TableSection::new(Shape::HeaderValue, vec![header_value_row(&grid)]);
            return Ok(Classified::clean(table));
        }

        match detect_nested(page, bbox) {
            Ok(Some(layout)) => {
                log::debug!(
                    "TableClassifier: page {}: nested with {} inner regions",
                    page.index(),
                    layout.inner.len()
                );
                let extraction = NestedTableResolver::new(page).resolve(&layout, &grid);
                let degraded = extraction.is_degraded();
                return Ok(Classified {
                    table: TableSection::new(Shape::Nested, extraction.into_inner()),
                    degraded,
                    dropped_rows: 0,
                });
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!(
                    "TableClassifier: page {}: nested detection failed ({}), treating as meta_header",
                    page.index(),
                    e
                );
            }
        }

        log::debug!("TableClassifier: page {}: meta_header", page.index());
        self.meta_header(grid)
    }

    /// Reconstruct a meta-header table: meta rows above, summary rows below,
    /// rectangular body in between.
    pub fn meta_header(&self, mut grid: Grid) -> Result<Classified> {
        let mut fragments = Vec::new();
        while grid.len() >= 2 && grid[0].len() != grid[1].len() {
            let row = grid.remove(0);
            fragments.extend(row.into_iter().filter(|c| !c.is_empty()));
        }

        let mut fields = IndexMap::new();
        for fragment in &fragments {
            parse_fragment(fragment, &mut fields);
        }

        let width = grid.first().map_or(0, Vec::len);
        let mut trailing = Vec::new();
        while grid.len() > 1 && grid.last().map_or(0, Vec::len) != width {
            if let Some(row) = grid.pop() {
                trailing.push(row);
            }
        }
        for row in trailing.into_iter().rev() {
            parse_trailing_row(&row, &mut fields);
        }

        let before = grid.len();
        if grid.iter().any(|r| r.len() != width) {
            if !self.options.is_lenient() {
                return Err(Error::StructuralAmbiguity(format!(
                    "ragged table body: expected {} cells per row",
                    width
                )));
            }
            grid.retain(|r| r.len() == width);
            log::warn!(
                "TableClassifier: dropped {} ragged body rows",
                before - grid.len()
            );
        }
        let dropped_rows = before - grid.len();

        let mut table = TableSection::new(Shape::MetaHeader, grid_to_rows(&grid));
        table.fields = fields;
        if !fragments.is_empty() {
            table.meta_headers = Some(fragments.join(&self.options.meta_separator));
        }

        Ok(Classified {
            table,
            degraded: false,
            dropped_rows,
        })
    }
}

/// Check whether a grid reads as alternating key row / value row pairs.
///
/// Paired rows must have equal length, the final row must not carry the
/// summary marker, and a grid of more than two rows must not be rectangular
/// as a whole. A single key/value pair is always eligible.
pub fn is_header_value(grid: &[Vec<String>], total_marker: &str) -> bool {
    if grid.len() < 2 {
        return false;
    }
    let pairs_align = grid
        .chunks_exact(2)
        .all(|pair| pair[0].len() == pair[1].len());
    let shape_fits = grid.len() == 2 || !is_rectangular(grid);
    let has_total = grid
        .last()
        .map_or(false, |row| row.iter().any(|c| c.trim() == total_marker));

    pairs_align && shape_fits && !has_total
}

/// Flatten key/value row pairs into one row. Empty keys are skipped.
fn header_value_row(grid: &[Vec<String>]) -> Row {
    let mut row = Row::new();
    for pair in grid.chunks_exact(2) {
        for (key, value) in pair[0].iter().zip(&pair[1]) {
            if !key.is_empty() {
                row.insert(key.clone(), value.clone());
            }
        }
    }
    row
}

/// Lower-case a label and join its words with `_`. Keys the table itself
/// serializes are renamed.
fn field_key(label: &str) -> String {
    let key = label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if key.is_empty() {
        return key;
    }
    TableSection::unreserved_key(key)
}

/// Trim a value, reducing a money literal to its numeric text.
fn scalar_text(raw: &str) -> String {
    let raw = raw.trim();
    match money_pattern().captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.to_string(),
    }
}

/// Parse `key: value` parts of a fragment split on `;` or newlines.
///
/// A part without a colon continues the previous key's value.
fn parse_fragment(fragment: &str, fields: &mut IndexMap<String, Value>) {
    let mut last_key: Option<String> = None;
    for part in fragment.split([';', '\n']) {
        match part.split_once(':') {
            Some((key, value)) => {
                let key = field_key(key);
                if key.is_empty() {
                    continue;
                }
                fields.insert(key.clone(), Value::String(scalar_text(value)));
                last_key = Some(key);
            }
            None => {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                if let Some(Value::String(existing)) =
                    last_key.as_ref().and_then(|k| fields.get_mut(k))
                {
                    if !existing.is_empty() {
                        existing.push(' ');
                    }
                    existing.push_str(part);
                }
            }
        }
    }
}

/// Parse a summary row below the body.
///
/// Colon cells are parsed like meta fragments; a two-cell row without a colon
/// is read as label and value.
fn parse_trailing_row(row: &[String], fields: &mut IndexMap<String, Value>) {
    let cells: Vec<&str> = row.iter().map(String::as_str).filter(|c| !c.is_empty()).collect();
    for (i, cell) in cells.iter().enumerate() {
        if cell.contains(':') {
            parse_fragment(cell, fields);
        } else if cells.len() == 2 && i == 0 {
            let key = field_key(cell);
            if !key.is_empty() {
                fields.insert(key, Value::String(scalar_text(cells[1])));
            }
        }
    }
}
