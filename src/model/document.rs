//! Document-level output of reconstruction.

use serde::Serialize;

use super::DocumentSection;

/// A reconstructed document: the ordered sections plus flattened search strings.
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructedDocument {
    /// Source identifier supplied with the raw bytes
    pub filename: String,

    /// Sections in page/reading order
    pub main_json: Vec<DocumentSection>,

    /// Every key and leaf value across all sections, whitespace-joined
    pub header_key: String,

    /// Structural keys across all sections, whitespace-joined
    pub header_only: String,

    /// Extraction statistics
    #[serde(skip)]
    pub stats: ReconstructionStats,
}

impl ReconstructedDocument {
    /// Build the output record from finalized sections.
    ///
    /// The search strings are computed from the sections as given, so this is
    /// called before normalization.
    pub fn new(filename: impl Into<String>, sections: Vec<DocumentSection>) -> Self {
        let header_key = sections
            .iter()
            .map(|s| s.key_terms().join(" "))
            .collect::<Vec<_>>()
            .join(" ")
            .replace('\n', " ")
            .replace(':', " ");
        let header_only = sections
            .iter()
            .map(|s| s.structural_keys().join(" "))
            .collect::<Vec<_>>()
            .join(" ")
            .replace(':', "")
            .replace('\n', " ");

        Self {
            filename: filename.into(),
            main_json: sections,
            header_key,
            header_only,
            stats: ReconstructionStats::default(),
        }
    }

    /// Attach statistics.
    pub fn with_stats(mut self, stats: ReconstructionStats) -> Self {
        self.stats = stats;
        self
    }

    /// Coerce every leaf string into a typed scalar where it looks like one.
    pub fn normalize(&mut self) {
        crate::normalize::normalize_sections(&mut self.main_json);
    }

    /// Get the sections.
    pub fn sections(&self) -> &[DocumentSection] {
        &self.main_json
    }

    /// Check if no section was reconstructed.
    pub fn is_empty(&self) -> bool {
        self.main_json.is_empty()
    }

    /// The text handed to downstream annotation stages.
    pub fn processed_text(&self) -> String {
        format!("{} {}", self.header_only, self.header_key)
    }
}

/// Statistics collected during reconstruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconstructionStats {
    /// Number of pages in the source document
    pub page_count: u32,

    /// Number of tables classified, including those later merged
    pub table_count: u32,

    /// Number of text sections emitted
    pub text_count: u32,

    /// Number of tables fused into a previous page's table
    pub merged_count: u32,

    /// Number of tables reconstructed by a fallback heuristic
    pub degraded_count: u32,

    /// Number of rows dropped as structurally ambiguous
    pub dropped_rows: u32,
}
