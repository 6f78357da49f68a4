//! Reconstruction options and configuration.

/// Options for reconstructing documents.
#[derive(Debug, Clone)]
pub struct ReconstructOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Cell text that marks a summary row; such a grid is never read as key/value pairs
    pub total_marker: String,

    /// Separator used when joining meta fragments into `meta_headers`
    pub meta_separator: String,

    /// Whether a table opening a page may continue the previous page's table
    pub merge_across_pages: bool,
}

impl ReconstructOptions {
    /// Create new reconstruct options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable strict mode (surface structural ambiguities as errors).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Set the summary-row marker.
    pub fn with_total_marker(mut self, marker: impl Into<String>) -> Self {
        self.total_marker = marker.into();
        self
    }

    /// Set the meta fragment separator.
    pub fn with_meta_separator(mut self, separator: impl Into<String>) -> Self {
        self.meta_separator = separator.into();
        self
    }

    /// Enable or disable cross-page table merging.
    pub fn with_page_merging(mut self, merge: bool) -> Self {
        self.merge_across_pages = merge;
        self
    }

    /// Check if recoverable errors should be absorbed.
    pub fn is_lenient(&self) -> bool {
        self.error_mode == ErrorMode::Lenient
    }
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Lenient,
            total_marker: "Total".to_string(),
            meta_separator: ";".to_string(),
            merge_across_pages: true,
        }
    }
}

/// Error handling mode during reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first structural ambiguity
    Strict,
    /// Drop or degrade ambiguous content and continue
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_options_builder() {
        let options = ReconstructOptions::new()
            .strict()
            .with_total_marker("Grand Total")
            .with_meta_separator(" | ")
            .with_page_merging(false);

        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.total_marker, "Grand Total");
        assert_eq!(options.meta_separator, " | ");
        assert!(!options.merge_across_pages);
        assert!(!options.is_lenient());
    }

    #[test]
    fn test_default_options() {
        let options = ReconstructOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.total_marker, "Total");
        assert!(options.merge_across_pages);
    }
}
