//! # unform
//!
//! Document structure reconstruction and schema inference for business
//! documents (invoices, purchase orders, receipts).
//!
//! A page-layout oracle renders a document as a markdown stream with table
//! markers. This library splits that stream into sections, classifies every
//! table (key/value pairs, nested tables, meta-header tables), stitches tables
//! that continue across pages, parses prose blocks into fields, normalizes
//! leaf values, and infers a typed schema annotated with semantic tags.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unform::{reconstruct_file, render};
//!
//! fn main() -> unform::Result<()> {
//!     // Reconstruct a recorded layout
//!     let doc = reconstruct_file("invoice.layout.json")?;
//!
//!     // Render the reconstruction contract
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Table classification**: header/value, nested and meta-header tables
//! - **Cross-page merging**: tables split by a page break are fused back
//! - **Degraded extraction**: nested tables fall back to a text heuristic
//!   when the layout oracle fails, and report it
//! - **Value normalization**: dates and money become typed scalars
//! - **Schema inference**: typed, tagged field schemas with change detection

pub mod error;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod schema;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    BBox, DocumentSection, ReconstructedDocument, ReconstructionStats, Row, Shape, TableSection,
    TextSection, Value,
};
pub use parser::{
    ErrorMode, LayoutOracle, ReconstructOptions, Reconstructor, RecordedDocument, RecordedLayout,
};
pub use render::JsonFormat;
pub use schema::{
    AnnotationSource, Entity, FingerprintStore, SchemaEngine, SchemaNode, SchemaOptions,
    SchemaOutcome, SchemaPublication, SchemaSink, SchemaType,
};

use std::io::Read;
use std::path::Path;

/// Reconstruct a recorded layout file.
///
/// The file name becomes the document's `filename`. Values are left as
/// reconstructed strings; call [`ReconstructedDocument::normalize`] for
/// typed values.
///
/// # Example
///
/// ```no_run
/// use unform::reconstruct_file;
///
/// let doc = reconstruct_file("invoice.layout.json").unwrap();
/// println!("Sections: {}", doc.sections().len());
/// ```
pub fn reconstruct_file<P: AsRef<Path>>(path: P) -> Result<ReconstructedDocument> {
    reconstruct_file_with_options(path, ReconstructOptions::default())
}

/// Reconstruct a recorded layout file with custom options.
///
/// # Example
///
/// ```no_run
/// use unform::{reconstruct_file_with_options, ReconstructOptions};
///
/// let options = ReconstructOptions::new()
///     .strict()
///     .with_page_merging(false);
/// let doc = reconstruct_file_with_options("invoice.layout.json", options).unwrap();
/// ```
pub fn reconstruct_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ReconstructOptions,
) -> Result<ReconstructedDocument> {
    let oracle = RecordedLayout::new();
    Reconstructor::with_options(&oracle, options).reconstruct_file(path)
}

/// Reconstruct a recorded layout from bytes.
///
/// # Example
///
/// ```no_run
/// use unform::reconstruct_bytes;
///
/// let data = std::fs::read("invoice.layout.json").unwrap();
/// let doc = reconstruct_bytes(&data, "invoice.pdf").unwrap();
/// ```
pub fn reconstruct_bytes(data: &[u8], filename: &str) -> Result<ReconstructedDocument> {
    reconstruct_bytes_with_options(data, filename, ReconstructOptions::default())
}

/// Reconstruct a recorded layout from bytes with custom options.
pub fn reconstruct_bytes_with_options(
    data: &[u8],
    filename: &str,
    options: ReconstructOptions,
) -> Result<ReconstructedDocument> {
    let oracle = RecordedLayout::new();
    Reconstructor::with_options(&oracle, options).reconstruct(data, filename)
}

/// Reconstruct a recorded layout from a reader.
pub fn reconstruct_reader<R: Read>(reader: R, filename: &str) -> Result<ReconstructedDocument> {
    let oracle = RecordedLayout::new();
    Reconstructor::new(&oracle).reconstruct_reader(reader, filename)
}

/// Reconstruct a recorded layout file and render it as JSON.
///
/// # Example
///
/// ```no_run
/// use unform::{to_json, JsonFormat};
///
/// let json = to_json("invoice.layout.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("invoice.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = reconstruct_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for reconstructing documents and inferring their schemas.
///
/// # Example
///
/// ```no_run
/// use unform::{AnnotationSource, SchemaEngine, SchemaOptions, Unform};
///
/// let engine = SchemaEngine::new(SchemaOptions::new().with_data_source("ds-1"));
/// let annotations = AnnotationSource::default();
///
/// let result = Unform::new()
///     .strict()
///     .reconstruct_file("invoice.layout.json")?;
/// let outcome = result.infer_schema(&engine, &annotations, "invoices")?;
/// println!("changed: {}", outcome.changed);
/// # Ok::<(), unform::Error>(())
/// ```
pub struct Unform<O: LayoutOracle = RecordedLayout> {
    oracle: O,
    options: ReconstructOptions,
    normalize: bool,
}

impl Unform<RecordedLayout> {
    /// Create a builder replaying recorded layouts.
    pub fn new() -> Self {
        Self::with_oracle(RecordedLayout::new())
    }
}

impl Default for Unform<RecordedLayout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: LayoutOracle> Unform<O> {
    /// Create a builder using a custom layout oracle.
    pub fn with_oracle(oracle: O) -> Self {
        Self {
            oracle,
            options: ReconstructOptions::default(),
            normalize: true,
        }
    }

    /// Replace the reconstruct options.
    pub fn with_options(mut self, options: ReconstructOptions) -> Self {
        self.options = options;
        self
    }

    /// Fail on structural ambiguities instead of dropping content.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Drop ambiguous content and continue (the default).
    pub fn lenient(mut self) -> Self {
        self.options = self.options.with_error_mode(ErrorMode::Lenient);
        self
    }

    /// Keep every table as its own section.
    pub fn without_page_merging(mut self) -> Self {
        self.options = self.options.with_page_merging(false);
        self
    }

    /// Keep reconstructed values as strings.
    pub fn raw_values(mut self) -> Self {
        self.normalize = false;
        self
    }

    /// Reconstruct a document from bytes.
    pub fn reconstruct(&self, data: &[u8], filename: &str) -> Result<UnformResult> {
        let document = Reconstructor::with_options(&self.oracle, self.options.clone())
            .reconstruct(data, filename)?;
        Ok(self.finish(document))
    }

    /// Reconstruct a document file.
    pub fn reconstruct_file<P: AsRef<Path>>(&self, path: P) -> Result<UnformResult> {
        let document = Reconstructor::with_options(&self.oracle, self.options.clone())
            .reconstruct_file(path)?;
        Ok(self.finish(document))
    }

    fn finish(&self, mut document: ReconstructedDocument) -> UnformResult {
        if self.normalize {
            document.normalize();
        }
        UnformResult { document }
    }
}

/// Result of reconstructing a document.
pub struct UnformResult {
    /// The reconstructed document
    pub document: ReconstructedDocument,
}

impl UnformResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Infer the document's schema under `topic`.
    pub fn infer_schema(
        &self,
        engine: &SchemaEngine,
        annotations: &AnnotationSource,
        topic: &str,
    ) -> Result<SchemaOutcome> {
        engine.detect(&self.document, annotations, topic)
    }

    /// Infer the document's schema and publish it to `sink` when it changed.
    pub fn publish_schema(
        &self,
        engine: &SchemaEngine,
        annotations: &AnnotationSource,
        topic: &str,
        sink: &dyn SchemaSink,
    ) -> Result<SchemaOutcome> {
        engine.infer_and_publish(&self.document, annotations, topic, sink)
    }

    /// Get the document.
    pub fn document(&self) -> &ReconstructedDocument {
        &self.document
    }

    /// Take the document.
    pub fn into_document(self) -> ReconstructedDocument {
        self.document
    }
}
