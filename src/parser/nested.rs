//! Nested table resolution.
//!
//! A nested table is an outer table whose rows carry inner tables drawn
//! inside the outer table's box. The precise path slices the outer box into
//! horizontal bands at every inner table edge and asks the layout oracle what
//! each band holds. When the oracle fails, the degraded path re-reads the
//! markdown grid and splits it by column count.

use crate::error::{Error, Result};
use crate::model::{BBox, Row};

use super::grid::{grid_to_rows, Grid};
use super::oracle::{LayoutOracle, PageView, TableStrategy, TextBlock};

/// Two vertical edges closer than this are the same boundary.
const EDGE_EPSILON: f32 = 0.01;

/// Outcome of an extraction that may have fallen back to a heuristic.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    /// Produced by the precise, layout-driven method
    Clean(T),
    /// Produced by the text heuristic after the precise method failed
    Degraded(T),
}

impl<T> Extraction<T> {
    /// Check if the fallback produced this value.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Extraction::Degraded(_))
    }

    /// Unwrap the extracted value.
    pub fn into_inner(self) -> T {
        match self {
            Extraction::Clean(v) | Extraction::Degraded(v) => v,
        }
    }

    /// Transform the value, keeping the tag.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        match self {
            Extraction::Clean(v) => Extraction::Clean(f(v)),
            Extraction::Degraded(v) => Extraction::Degraded(f(v)),
        }
    }
}

/// Outer region of a nested table and the inner table regions inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedLayout {
    /// Full table region
    pub outer: BBox,
    /// Inner table regions, top to bottom
    pub inner: Vec<BBox>,
}

/// Detect whether `region` holds a nested table.
///
/// The outer table is the first table the oracle finds in the region. Inner
/// tables are looked for below the outer header with strict line detection.
/// A single inner table with the outer table's column count is the outer
/// body itself, not a nested table.
pub fn detect_nested<O: LayoutOracle>(
    page: &PageView<'_, O>,
    region: BBox,
) -> Result<Option<NestedLayout>> {
    let outer_tables = page.find_tables(region, TableStrategy::Lines)?;
    let Some(outer) = outer_tables.first() else {
        return Ok(None);
    };

    let below_header = region.with_vertical(outer.header_bottom(), region.y1);
    let inner = page.find_tables(below_header, TableStrategy::LinesStrict)?;
    if inner.is_empty() {
        return Ok(None);
    }
    if inner.len() == 1 && inner[0].column_count == outer.column_count {
        log::debug!(
            "NestedTableResolver: single inner region with {} columns matches outer, not nested",
            outer.column_count
        );
        return Ok(None);
    }

    Ok(Some(NestedLayout {
        outer: region,
        inner: inner.iter().map(|t| t.bbox).collect(),
    }))
}

/// Resolves nested tables into outer rows carrying `inner` tables.
pub struct NestedTableResolver<'v, 'a, O: LayoutOracle> {
    page: &'v PageView<'a, O>,
}

impl<'v, 'a, O: LayoutOracle> NestedTableResolver<'v, 'a, O> {
    /// Create a resolver for one page.
    pub fn new(page: &'v PageView<'a, O>) -> Self {
        Self { page }
    }

    /// Resolve a nested table, degrading to the grid heuristic when the oracle fails.
    pub fn resolve(&self, layout: &NestedLayout, grid: &Grid) -> Extraction<Vec<Row>> {
        match self.resolve_by_bands(layout) {
            Ok(rows) => Extraction::Clean(rows),
            Err(e) => {
                log::warn!(
                    "NestedTableResolver: page {}: band extraction failed ({}), using column-count fallback",
                    self.page.index(),
                    e
                );
                Extraction::Degraded(resolve_from_grid(grid))
            }
        }
    }

    /// Precise path: slice the outer box into bands and ask the oracle about each.
    pub fn resolve_by_bands(&self, layout: &NestedLayout) -> Result<Vec<Row>> {
        let bands = bands(layout);
        let Some((first_band, rest)) = bands.split_first() else {
            return Err(Error::Oracle("nested table has no height".to_string()));
        };

        let mut outer = OuterGrid::default();
        outer.push_rows(rows_from_blocks(self.page.text_blocks(*first_band)?));

        for band in rest {
            let tables = self.page.find_tables(*band, TableStrategy::Lines)?;
            match tables.first() {
                Some(first) if first.has_header_names() => {
                    for table in tables {
                        outer.attach(table.rows);
                    }
                }
                _ => outer.push_rows(rows_from_blocks(self.page.text_blocks(*band)?)),
            }
        }

        if outer.rows.is_empty() {
            return Err(Error::Oracle(format!(
                "no text found in nested table region on page {}",
                self.page.index()
            )));
        }
        outer.drop_trailing_artifact();
        Ok(outer.into_rows())
    }
}

/// Horizontal bands between consecutive distinct Y edges of the outer and inner boxes.
fn bands(layout: &NestedLayout) -> Vec<BBox> {
    let mut edges = vec![layout.outer.y0, layout.outer.y1];
    for b in &layout.inner {
        edges.push(b.y0);
        edges.push(b.y1);
    }
    edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    edges.dedup_by(|a, b| (*a - *b).abs() < EDGE_EPSILON);

    edges
        .windows(2)
        .map(|w| layout.outer.with_vertical(w[0], w[1]))
        .collect()
}

/// One grid row per text block, one cell per line.
fn rows_from_blocks(blocks: Vec<TextBlock>) -> Grid {
    blocks
        .into_iter()
        .map(|b| b.text.trim().split('\n').map(str::to_string).collect())
        .collect()
}

/// Outer rows (header first) with the inner grid attached to each.
#[derive(Default)]
struct OuterGrid {
    rows: Grid,
    inner: Vec<Option<Grid>>,
}

impl OuterGrid {
    fn push_rows(&mut self, rows: Grid) {
        for row in rows {
            self.rows.push(row);
            self.inner.push(None);
        }
    }

    /// Attach an inner table to the most recent outer row.
    ///
    /// With only a header so far, a blank outer row is synthesized as anchor.
    fn attach(&mut self, table: Grid) {
        if table.is_empty() {
            return;
        }
        if self.rows.len() <= 1 {
            let width = self.rows.first().map_or(0, Vec::len);
            self.push_rows(vec![vec![String::new(); width]]);
        }
        if let Some(slot) = self.inner.last_mut() {
            match slot {
                Some(existing) => {
                    let repeats_header = existing.first() == table.first();
                    existing.extend(table.into_iter().skip(usize::from(repeats_header)));
                }
                None => *slot = Some(table),
            }
        }
    }

    /// Drop a last row whose cell count differs from the header's.
    fn drop_trailing_artifact(&mut self) {
        if self.rows.len() < 2 {
            return;
        }
        let header_len = self.rows[0].len();
        if self.rows.last().map_or(0, Vec::len) == header_len {
            return;
        }
        self.rows.pop();
        let orphan = self.inner.pop().flatten();
        log::debug!("NestedTableResolver: dropped trailing outer row with mismatched width");

        if let Some(grid) = orphan {
            match self.inner.last_mut() {
                Some(slot @ None) if self.rows.len() > 1 => *slot = Some(grid),
                _ => log::warn!("NestedTableResolver: inner table of dropped row discarded"),
            }
        }
    }

    fn into_rows(self) -> Vec<Row> {
        let mut rows = grid_to_rows(&self.rows);
        for (row, inner) in rows.iter_mut().zip(self.inner.into_iter().skip(1)) {
            if let Some(grid) = inner {
                row.set_inner(grid_to_rows(&grid));
            }
        }
        rows
    }
}

/// Degraded path: split a markdown grid by column count.
///
/// Rows as wide as the first row are outer rows; all others belong to the
/// inner table of the preceding outer row (a leading empty cell is dropped as
/// indentation). Inner rows before any outer data row get a blank anchor row.
pub fn resolve_from_grid(grid: &Grid) -> Vec<Row> {
    let Some((header, body)) = grid.split_first() else {
        return Vec::new();
    };
    let width = header.len();
    let mut outer = OuterGrid::default();
    outer.push_rows(vec![header.clone()]);

    for cells in body {
        if cells.len() == width {
            outer.push_rows(vec![cells.clone()]);
            continue;
        }
        let mut cells = cells.clone();
        if cells.first().map_or(false, String::is_empty) {
            cells.remove(0);
        }
        if outer.rows.len() == 1 {
            outer.push_rows(vec![vec![String::new(); width]]);
        }
        if let Some(slot) = outer.inner.last_mut() {
            slot.get_or_insert_with(Vec::new).push(cells);
        }
    }

    outer.into_rows()
}
