//! Document reconstruction driver.

use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{DocumentSection, ReconstructedDocument, ReconstructionStats};

use super::classifier::TableClassifier;
use super::grid::parse_markdown_grid;
use super::merger::{CrossPageMerger, MergeOutcome};
use super::options::ReconstructOptions;
use super::oracle::{LayoutOracle, PageView};
use super::sectionizer::{sectionize, RawContent};
use super::text::parse_text_section;

/// Reconstructs the section structure of documents opened through a layout oracle.
pub struct Reconstructor<'a, O: LayoutOracle> {
    oracle: &'a O,
    options: ReconstructOptions,
}

impl<'a, O: LayoutOracle> Reconstructor<'a, O> {
    /// Create a reconstructor with default options.
    pub fn new(oracle: &'a O) -> Self {
        Self::with_options(oracle, ReconstructOptions::default())
    }

    /// Create a reconstructor with custom options.
    pub fn with_options(oracle: &'a O, options: ReconstructOptions) -> Self {
        Self { oracle, options }
    }

    /// Get the options in use.
    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Reconstruct a document file. The file name becomes the document's filename.
    pub fn reconstruct_file<P: AsRef<Path>>(&self, path: P) -> Result<ReconstructedDocument> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.reconstruct(&bytes, &filename)
    }

    /// Reconstruct a document from a reader.
    pub fn reconstruct_reader<R: Read>(
        &self,
        mut reader: R,
        filename: &str,
    ) -> Result<ReconstructedDocument> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.reconstruct(&data, filename)
    }

    /// Reconstruct a document from bytes.
    ///
    /// Fails with [`Error::UnparseableDocument`] when the oracle cannot open
    /// the bytes; no partial output is produced in that case.
    pub fn reconstruct(&self, bytes: &[u8], filename: &str) -> Result<ReconstructedDocument> {
        let doc = self.oracle.open_document(bytes).map_err(|e| match e {
            Error::UnparseableDocument(_) => e,
            other => Error::UnparseableDocument(other.to_string()),
        })?;

        let markdown = self.oracle.to_markdown(&doc)?;
        let raw_sections = sectionize(&markdown);

        let mut stats = ReconstructionStats {
            page_count: self.oracle.page_count(&doc) as u32,
            ..Default::default()
        };
        let classifier = TableClassifier::new(&self.options);
        let merger = CrossPageMerger::new(&self.options);

        let mut sections: Vec<DocumentSection> = Vec::new();
        let mut current_page = None;

        for raw in raw_sections {
            let first_on_page = current_page != Some(raw.page);
            current_page = Some(raw.page);

            match raw.content {
                RawContent::Text(text) => {
                    let section = parse_text_section(&text);
                    if section.is_empty() {
                        continue;
                    }
                    stats.text_count += 1;
                    sections.push(DocumentSection::Text(section));
                }
                RawContent::Table { bbox, body } => {
                    let page = PageView::new(self.oracle, &doc, raw.page);
                    let grid = parse_markdown_grid(&body);

                    let classified = match classifier.classify(grid, bbox, &page) {
                        Ok(classified) => classified,
                        Err(e) if e.is_recoverable() && self.options.is_lenient() => {
                            log::warn!("Reconstructor: {}: skipping table on page {}: {}", filename, raw.page, e);
                            continue;
                        }
                        Err(e) => return Err(e),
                    };

                    stats.table_count += 1;
                    stats.dropped_rows += classified.dropped_rows as u32;
                    if classified.degraded {
                        stats.degraded_count += 1;
                    }

                    let outcome =
                        merger.push(&mut sections, DocumentSection::Table(classified.table), first_on_page);
                    if outcome == MergeOutcome::Merged {
                        stats.merged_count += 1;
                    }
                }
            }
        }

        log::debug!(
            "Reconstructor: {}: {} sections from {} pages ({} merged, {} degraded)",
            filename,
            sections.len(),
            stats.page_count,
            stats.merged_count,
            stats.degraded_count
        );

        Ok(ReconstructedDocument::new(filename, sections).with_stats(stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Shape;
    use crate::parser::oracle::{RecordedDocument, RecordedLayout, RecordedPage};

    fn recorded(markdown: &str, pages: usize) -> Vec<u8> {
        let doc = RecordedDocument {
            markdown: markdown.to_string(),
            pages: vec![RecordedPage::default(); pages],
        };
        serde_json::to_vec(&doc).unwrap()
    }

    #[test]
    fn test_reconstruct_text_and_tables() {
        let bytes = recorded(
            "# Invoice\n\nINV00000156\n[TAB]\n##0;0;100;100##\n|Code|Value|\n|---|---|\n|ZIP|95124|\n",
            1,
        );
        let oracle = RecordedLayout::new();
        let doc = Reconstructor::new(&oracle).reconstruct(&bytes, "inv.pdf").unwrap();

        assert_eq!(doc.filename, "inv.pdf");
        assert_eq!(doc.main_json.len(), 2);
        assert_eq!(doc.main_json[1].as_table().unwrap().shape, Shape::HeaderValue);
        assert_eq!(doc.stats.table_count, 1);
        assert_eq!(doc.stats.text_count, 1);
        assert!(doc.header_key.contains("ZIP"));
    }

    #[test]
    fn test_meta_header_tables_merge_across_pages() {
        let bytes = recorded(
            "##0;0;100;100##\n|Item|Qty|\n|Bolt|4|\n|Nut|8|\n-----\n##0;0;100;100##\n|Item|Qty|\n|Washer|2|\n|Pin|1|\n",
            2,
        );
        let oracle = RecordedLayout::new();
        let doc = Reconstructor::new(&oracle).reconstruct(&bytes, "po.pdf").unwrap();
        assert_eq!(doc.main_json.len(), 1);
        assert_eq!(doc.main_json[0].as_table().unwrap().rows.len(), 4);
        assert_eq!(doc.stats.merged_count, 1);

        let options = ReconstructOptions::new().with_page_merging(false);
        let doc = Reconstructor::with_options(&oracle, options)
            .reconstruct(&bytes, "po.pdf")
            .unwrap();
        assert_eq!(doc.main_json.len(), 2);
    }

    #[test]
    fn test_unparseable_document() {
        let oracle = RecordedLayout::new();
        let result = Reconstructor::new(&oracle).reconstruct(b"\x00\x01garbage", "x.pdf");
        assert!(matches!(result, Err(Error::UnparseableDocument(_))));
    }
}
