//! Page-layout oracle abstraction.
//!
//! Reconstruction never renders documents itself. It asks a [`LayoutOracle`]
//! for the markdown stream of a document, for the text blocks inside a
//! region, and for the tables a ruling-line detector finds inside a region.
//! [`RecordedLayout`] replays a layout captured as JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::BBox;

/// Slack, in points, when testing whether a table lies inside a clip region.
const CLIP_TOLERANCE: f32 = 1.0;

/// A block of text with its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Block bounds
    pub bbox: BBox,
    /// Block text, lines separated by `\n`
    pub text: String,
}

/// Header row of a detected table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHeader {
    /// Header row bounds
    pub bbox: BBox,
    /// Column names; empty when the detector found no header
    #[serde(default)]
    pub names: Vec<String>,
}

/// A table found by the oracle's table detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundTable {
    /// Table bounds
    pub bbox: BBox,
    /// Number of columns
    pub column_count: usize,
    /// Header row, if one was detected
    #[serde(default)]
    pub header: Option<TableHeader>,
    /// Cell text, row-major, header row first
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    /// Only report this table for the given strategy (any strategy when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<TableStrategy>,
}

impl FoundTable {
    /// Check if the detector reported named columns.
    pub fn has_header_names(&self) -> bool {
        self.header.as_ref().map_or(false, |h| !h.names.is_empty())
    }

    /// Bottom edge of the header row, or the table top when no header was found.
    pub fn header_bottom(&self) -> f32 {
        self.header.as_ref().map_or(self.bbox.y0, |h| h.bbox.y1)
    }
}

/// Table detection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStrategy {
    /// Ruling lines, tolerant of gaps
    #[default]
    Lines,
    /// Ruling lines only, no intersection tolerance (finds inner tables)
    LinesStrict,
}

/// Abstract interface to a page-layout engine.
///
/// Implementations own document decoding; everything reconstruction needs is
/// requested through this trait.
pub trait LayoutOracle {
    /// Decoded document handle.
    type Document;

    /// Decode a document from bytes.
    ///
    /// Fails with [`Error::UnparseableDocument`] when the bytes cannot be opened.
    fn open_document(&self, bytes: &[u8]) -> Result<Self::Document>;

    /// Number of pages.
    fn page_count(&self, doc: &Self::Document) -> usize;

    /// Markdown rendering of the whole document: `[TAB]` separated segments,
    /// `##x0;y0;x1;y1##` table markers, `-----` page breaks.
    fn to_markdown(&self, doc: &Self::Document) -> Result<String>;

    /// Text blocks intersecting `clip`, in reading order.
    fn text_blocks(&self, doc: &Self::Document, page: usize, clip: BBox) -> Result<Vec<TextBlock>>;

    /// Tables found inside `clip`.
    fn find_tables(
        &self,
        doc: &Self::Document,
        page: usize,
        clip: BBox,
        strategy: TableStrategy,
    ) -> Result<Vec<FoundTable>>;
}

/// A single page of an opened document, as seen through its oracle.
pub struct PageView<'a, O: LayoutOracle> {
    oracle: &'a O,
    doc: &'a O::Document,
    index: usize,
}

impl<'a, O: LayoutOracle> PageView<'a, O> {
    /// Create a view of page `index`.
    pub fn new(oracle: &'a O, doc: &'a O::Document, index: usize) -> Self {
        Self { oracle, doc, index }
    }

    /// Page index (0-based).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Text blocks intersecting `clip`.
    pub fn text_blocks(&self, clip: BBox) -> Result<Vec<TextBlock>> {
        self.oracle.text_blocks(self.doc, self.index, clip)
    }

    /// Tables inside `clip`.
    pub fn find_tables(&self, clip: BBox, strategy: TableStrategy) -> Result<Vec<FoundTable>> {
        self.oracle.find_tables(self.doc, self.index, clip, strategy)
    }
}

/// A layout captured ahead of time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedDocument {
    /// Markdown stream of the whole document
    pub markdown: String,
    /// Per-page layout
    #[serde(default)]
    pub pages: Vec<RecordedPage>,
}

/// Layout of one recorded page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedPage {
    /// Text blocks in reading order
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
    /// Tables on the page
    #[serde(default)]
    pub tables: Vec<FoundTable>,
}

/// Oracle that replays [`RecordedDocument`]s encoded as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedLayout;

impl RecordedLayout {
    /// Create a new recorded-layout oracle.
    pub fn new() -> Self {
        Self
    }

    fn page<'d>(&self, doc: &'d RecordedDocument, page: usize) -> Result<&'d RecordedPage> {
        doc.pages.get(page).ok_or_else(|| {
            Error::Oracle(format!(
                "page {} is out of range (document has {} pages)",
                page,
                doc.pages.len()
            ))
        })
    }
}

impl LayoutOracle for RecordedLayout {
    type Document = RecordedDocument;

    fn open_document(&self, bytes: &[u8]) -> Result<RecordedDocument> {
        serde_json::from_slice(bytes).map_err(|e| Error::UnparseableDocument(e.to_string()))
    }

    fn page_count(&self, doc: &RecordedDocument) -> usize {
        doc.pages.len()
    }

    fn to_markdown(&self, doc: &RecordedDocument) -> Result<String> {
        Ok(doc.markdown.clone())
    }

    fn text_blocks(&self, doc: &RecordedDocument, page: usize, clip: BBox) -> Result<Vec<TextBlock>> {
        Ok(self
            .page(doc, page)?
            .text_blocks
            .iter()
            .filter(|b| b.bbox.intersects(&clip))
            .cloned()
            .collect())
    }

    fn find_tables(
        &self,
        doc: &RecordedDocument,
        page: usize,
        clip: BBox,
        strategy: TableStrategy,
    ) -> Result<Vec<FoundTable>> {
        Ok(self
            .page(doc, page)?
            .tables
            .iter()
            .filter(|t| t.strategy.map_or(true, |s| s == strategy))
            .filter(|t| clip.contains(&t.bbox, CLIP_TOLERANCE))
            .cloned()
            .collect())
    }
}
