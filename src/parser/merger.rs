//! Cross-page table continuation.
//!
//! A table that opens a page may be the continuation of the table that ended
//! the previous page. Continuations are fused into the last section; anything
//! else is appended. Sections already in the list are never reordered and
//! never lose rows.

use crate::model::{DocumentSection, Row, Shape, TableSection, Value};

use super::grid::{grid_to_rows, rows_to_grid};
use super::options::ReconstructOptions;

/// What happened to a section handed to the merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Fused into the previous table
    Merged,
    /// Appended as an independent section
    Appended,
}

/// Appends sections to a document, fusing page-spanning tables.
pub struct CrossPageMerger<'o> {
    options: &'o ReconstructOptions,
}

impl<'o> CrossPageMerger<'o> {
    /// Create a merger.
    pub fn new(options: &'o ReconstructOptions) -> Self {
        Self { options }
    }

    /// Add `section` to `sections`, merging it into the last table when it
    /// is a continuation.
    ///
    /// Only a table that is the first section on its page is considered.
    pub fn push(
        &self,
        sections: &mut Vec<DocumentSection>,
        section: DocumentSection,
        first_on_page: bool,
    ) -> MergeOutcome {
        if !first_on_page || !self.options.merge_across_pages {
            sections.push(section);
            return MergeOutcome::Appended;
        }

        let new = match section {
            DocumentSection::Table(table) => table,
            other => {
                sections.push(other);
                return MergeOutcome::Appended;
            }
        };

        let Some(last) = sections.last_mut().and_then(DocumentSection::as_table_mut) else {
            sections.push(DocumentSection::Table(new));
            return MergeOutcome::Appended;
        };

        match self.merge_tables(last, new) {
            Ok(()) => MergeOutcome::Merged,
            Err(new) => {
                sections.push(DocumentSection::Table(new));
                MergeOutcome::Appended
            }
        }
    }

    /// Fuse `new` into `last`, or hand it back when it is not a continuation.
    ///
    /// `new` continues `last` when both have the same mergeable shape and the
    /// last row of `last` has every field of `new`'s first row.
    pub fn merge_tables(
        &self,
        last: &mut TableSection,
        new: TableSection,
    ) -> std::result::Result<(), TableSection> {
        let header = new.header();
        let fits = !new.rows.is_empty()
            && last
                .rows
                .last()
                .map_or(false, |row| header.iter().all(|h| row.contains_key(h)));

        if !fits || last.shape != new.shape {
            log::debug!(
                "CrossPageMerger: not a continuation ({} after {}, header fits: {})",
                new.shape,
                last.shape,
                fits
            );
            return Err(new);
        }

        match new.shape {
            Shape::Nested => {
                merge_nested(last, new, &header);
                Ok(())
            }
            Shape::MetaHeader => {
                merge_meta_header(last, new, &self.options.meta_separator);
                Ok(())
            }
            Shape::HeaderValue => Err(new),
        }
    }
}

fn merge_nested(last: &mut TableSection, new: TableSection, header: &[String]) {
    let before = last.rows.len();
    let outer = last.header();
    let mut rows = new.rows.into_iter();
    let Some(mut first) = rows.next() else {
        return;
    };

    if first.is_blank_under(header) {
        if let Some(continuation) = first.take_inner() {
            continue_inner(last, continuation);
        }
    } else {
        last.rows.push(conform(first, &outer));
    }
    last.rows.extend(rows.map(|row| conform(row, &outer)));

    log::debug!(
        "CrossPageMerger: nested continuation, {} -> {} outer rows",
        before,
        last.rows.len()
    );
}

/// Lay `row` out under `header`, blank-filling the fields it lacks.
fn conform(mut row: Row, header: &[String]) -> Row {
    if row.field_names().eq(header.iter().map(String::as_str)) {
        return row;
    }
    let mut out = Row::new();
    for name in header {
        let value = row
            .fields_mut()
            .shift_remove(name)
            .unwrap_or_else(|| Value::String(String::new()));
        out.insert(name.as_str(), value);
    }
    if let Some(inner) = row.take_inner() {
        out.set_inner(inner);
    }
    out
}

fn field_names(row: &Row) -> Vec<String> {
    row.field_names().map(str::to_string).collect()
}

/// Append a page's inner-table continuation to the last outer row.
///
/// When the continuation's header differs from the inner header already in
/// use, the continuation header was a data row misread as a header: it is put
/// back as data under the known header.
fn continue_inner(last: &mut TableSection, continuation: Vec<Row>) {
    let known_header = match last.rows.last().and_then(Row::inner) {
        Some(inner) => inner.first().map(field_names),
        None => last
            .rows
            .iter()
            .find_map(Row::inner)
            .and_then(|inner| inner.first())
            .map(field_names),
    };

    let continuation = match known_header {
        Some(header) if continuation.first().map(field_names).as_ref() != Some(&header) => {
            rekey(&header, &continuation)
        }
        _ => continuation,
    };

    let Some(target) = last.rows.last_mut() else {
        return;
    };
    match target.inner_mut() {
        Some(existing) if is_placeholder(existing) => *existing = continuation,
        Some(existing) => existing.extend(continuation),
        None => target.set_inner(continuation),
    }
}

/// Re-read rows under `header`, turning their own header into the first data row.
fn rekey(header: &[String], rows: &[Row]) -> Vec<Row> {
    let mut grid = rows_to_grid(rows);
    grid.retain(|cells| cells.iter().any(|c| !c.trim().is_empty()));
    grid.insert(0, header.to_vec());
    grid_to_rows(&grid)
}

/// A single all-blank row standing in for a header-only inner table.
fn is_placeholder(rows: &[Row]) -> bool {
    matches!(rows, [only] if only.fields().values().all(|v| v.is_blank()))
}

fn merge_meta_header(last: &mut TableSection, new: TableSection, separator: &str) {
    let header = last.header();
    last.rows
        .extend(new.rows.into_iter().map(|row| conform(row, &header)));
    for (key, value) in new.fields {
        last.fields.insert(key, value);
    }

    if let Some(meta) = new.meta_headers.filter(|m| !m.is_empty()) {
        last.meta_headers = Some(match last.meta_headers.take().filter(|m| !m.is_empty()) {
            Some(previous) => format!("{}{}{}", previous, separator, meta),
            None => meta,
        });
    }
    log::debug!("CrossPageMerger: meta_header continuation, {} rows", last.rows.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextSection;

    fn row(pairs: &[(&str, &str)]) -> Row {
        Row::from_pairs(pairs.iter().copied())
    }

    fn items(n: usize, prefix: &str) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let item = format!("{}{}", prefix, i);
                row(&[("Item", item.as_str()), ("Desc", "x")])
            })
            .collect()
    }

    fn nested_page_one() -> TableSection {
        let mut first = row(&[("PO", "4500"), ("Qty", "3")]);
        first.set_inner(items(2, "A"));
        TableSection::new(Shape::Nested, vec![first])
    }

    #[test]
    fn test_nested_continuation_grows_inner() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);

        let mut cont = row(&[("PO", ""), ("Qty", "")]);
        cont.set_inner(items(3, "B"));
        let page_two = TableSection::new(Shape::Nested, vec![cont]);

        let mut sections = vec![DocumentSection::Table(nested_page_one())];
        let outcome = merger.push(&mut sections, DocumentSection::Table(page_two), true);

        assert_eq!(outcome, MergeOutcome::Merged);
        assert_eq!(sections.len(), 1);
        let table = sections[0].as_table().unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].inner().unwrap().len(), 5);
    }

    #[test]
    fn test_misread_inner_header_becomes_data() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);

        // "B0 | y" was read as the inner header on the new page.
        let mut cont = row(&[("PO", ""), ("Qty", "")]);
        cont.set_inner(vec![
            row(&[("B0", "B1"), ("y", "z")]),
            row(&[("B0", "B2"), ("y", "w")]),
        ]);
        let mut last = nested_page_one();
        merger
            .merge_tables(&mut last, TableSection::new(Shape::Nested, vec![cont]))
            .unwrap();

        let inner = last.rows[0].inner().unwrap();
        assert_eq!(inner.len(), 5);
        assert_eq!(inner[2].get("Item"), Some(&Value::from("B0")));
        assert_eq!(inner[4].get("Desc"), Some(&Value::from("w")));
    }

    #[test]
    fn test_placeholder_inner_is_replaced() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);

        let mut last = nested_page_one();
        let mut second = row(&[("PO", "4501"), ("Qty", "1")]);
        second.set_inner(vec![Row::blank(["Item", "Desc"])]);
        last.rows.push(second);

        let mut cont = row(&[("PO", ""), ("Qty", "")]);
        cont.set_inner(items(2, "C"));
        let next = row(&[("PO", "4502"), ("Qty", "9")]);
        merger
            .merge_tables(&mut last, TableSection::new(Shape::Nested, vec![cont, next]))
            .unwrap();

        assert_eq!(last.rows.len(), 3);
        assert_eq!(last.rows[1].inner().unwrap().len(), 2);
    }

    #[test]
    fn test_non_blank_first_row_appends_all() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);
        let mut last = nested_page_one();
        let new = TableSection::new(Shape::Nested, vec![row(&[("PO", "4600"), ("Qty", "2")])]);
        merger.merge_tables(&mut last, new).unwrap();
        assert_eq!(last.rows.len(), 2);
    }

    #[test]
    fn test_partial_header_rows_are_blank_filled() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);
        let mut last = nested_page_one();
        let new = TableSection::new(Shape::Nested, vec![row(&[("PO", "4600")])]);

        merger.merge_tables(&mut last, new).unwrap();
        assert_eq!(last.rows.len(), 2);
        assert!(last.is_uniform());
        assert_eq!(last.rows[1].get("PO"), Some(&Value::from("4600")));
        assert_eq!(last.rows[1].get("Qty"), Some(&Value::from("")));
    }

    #[test]
    fn test_partial_header_meta_rows_are_blank_filled() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);
        let mut last = TableSection::new(
            Shape::MetaHeader,
            vec![row(&[("Item", "Bolt"), ("Qty", "4")])],
        );
        let new = TableSection::new(
            Shape::MetaHeader,
            vec![row(&[("Item", "Nut")]), row(&[("Item", "Pin")])],
        );

        merger.merge_tables(&mut last, new).unwrap();
        assert_eq!(last.rows.len(), 3);
        assert!(last.is_uniform());
        assert_eq!(last.header(), vec!["Item", "Qty"]);
        assert_eq!(last.rows[2].get("Qty"), Some(&Value::from("")));
    }

    #[test]
    fn test_meta_header_merge() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);

        let mut last = TableSection::new(Shape::MetaHeader, vec![row(&[("Item", "Bolt")])]);
        last.meta_headers = Some("PO: 1".to_string());
        let mut new = TableSection::new(Shape::MetaHeader, vec![row(&[("Item", "Nut")])]);
        new.meta_headers = Some("Total: $5".to_string());
        new.fields.insert("total".to_string(), Value::from("5"));

        merger.merge_tables(&mut last, new).unwrap();
        assert_eq!(last.rows.len(), 2);
        assert_eq!(last.meta_headers.as_deref(), Some("PO: 1;Total: $5"));
        assert_eq!(last.fields.get("total"), Some(&Value::from("5")));
    }

    #[test]
    fn test_mismatch_appends() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);

        let mut sections = vec![DocumentSection::Table(nested_page_one())];
        let other = TableSection::new(Shape::MetaHeader, vec![row(&[("PO", "1"), ("Qty", "2")])]);
        let outcome = merger.push(&mut sections, DocumentSection::Table(other), true);
        assert_eq!(outcome, MergeOutcome::Appended);

        let unrelated = TableSection::new(Shape::MetaHeader, vec![row(&[("Sku", "1")])]);
        merger.push(&mut sections, DocumentSection::Table(unrelated), true);
        assert_eq!(sections.len(), 3);
    }

    #[test]
    fn test_only_first_section_on_page_merges() {
        let options = ReconstructOptions::default();
        let merger = CrossPageMerger::new(&options);
        let mut sections = vec![DocumentSection::Table(nested_page_one())];
        let new = TableSection::new(Shape::Nested, vec![row(&[("PO", "4600"), ("Qty", "2")])]);
        merger.push(&mut sections, DocumentSection::Table(new.clone()), false);
        assert_eq!(sections.len(), 2);

        let mut sections = vec![DocumentSection::Text(TextSection::new())];
        merger.push(&mut sections, DocumentSection::Table(new), true);
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn test_merging_disabled() {
        let options = ReconstructOptions::new().with_page_merging(false);
        let merger = CrossPageMerger::new(&options);
        let mut sections = vec![DocumentSection::Table(nested_page_one())];
        let new = TableSection::new(Shape::Nested, vec![row(&[("PO", "4600"), ("Qty", "2")])]);
        assert_eq!(
            merger.push(&mut sections, DocumentSection::Table(new), true),
            MergeOutcome::Appended
        );
    }
}
