//! Document reconstruction module.

mod classifier;
mod grid;
mod merger;
mod nested;
mod options;
mod oracle;
mod reconstructor;
mod sectionizer;
mod text;

pub use classifier::{is_header_value, Classified, TableClassifier};
pub use grid::{grid_to_rows, is_rectangular, parse_markdown_grid, rows_to_grid, Grid};
pub use merger::{CrossPageMerger, MergeOutcome};
pub use nested::{detect_nested, resolve_from_grid, Extraction, NestedLayout, NestedTableResolver};
pub use options::{ErrorMode, ReconstructOptions};
pub use oracle::{
    FoundTable, LayoutOracle, PageView, RecordedDocument, RecordedLayout, RecordedPage,
    TableHeader, TableStrategy, TextBlock,
};
pub use reconstructor::Reconstructor;
pub use sectionizer::{sectionize, RawContent, RawSection};
pub use text::{parse_text_section, REFERENCE_ID_KEY};
