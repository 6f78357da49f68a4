//! Splits a document's markdown stream into page-stamped sections.
//!
//! The stream contains `-----` page breaks, `[TAB]` segment separators and
//! `##x0;y0;x1;y1##` markers in front of every table. Each non-blank segment
//! becomes one [`RawSection`]; marked segments become table sections.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::BBox;

fn page_break_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n-{5,}\n").expect("valid regex"))
}

fn segment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n?\[TAB\]\n").expect("valid regex"))
}

fn table_marker_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*#{2}([\d.;\-]+)#{2}[ \t]*\n?").expect("valid regex"))
}

/// Content of a raw section.
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// A marked table: the region it occupied and its pipe-delimited body
    Table {
        /// Region from the marker
        bbox: BBox,
        /// Markdown table text after the marker line
        body: String,
    },
    /// A prose block
    Text(String),
}

/// A section of the markdown stream stamped with its page index.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    /// Page index (0-based)
    pub page: usize,
    /// Section content
    pub content: RawContent,
}

impl RawSection {
    /// Check if this section is a marked table.
    pub fn is_table(&self) -> bool {
        matches!(self.content, RawContent::Table { .. })
    }
}

/// Split a markdown stream into ordered, page-stamped sections.
///
/// Pages that produce no section are simply absent from the output.
pub fn sectionize(markdown: &str) -> Vec<RawSection> {
    let mut sections = Vec::new();

    for (page, page_text) in page_break_pattern().split(markdown).enumerate() {
        for segment in segment_pattern().split(page_text) {
            if segment.trim().is_empty() {
                continue;
            }
            let content = classify_segment(segment);
            log::debug!(
                "Sectionizer: page {} -> {}",
                page,
                if matches!(content, RawContent::Table { .. }) { "table" } else { "text" }
            );
            sections.push(RawSection { page, content });
        }
    }

    sections
}

fn classify_segment(segment: &str) -> RawContent {
    if let Some(caps) = table_marker_pattern().captures(segment) {
        match BBox::from_marker(&caps[1]) {
            Some(bbox) => {
                let body = segment[caps.get(0).map_or(0, |m| m.end())..].to_string();
                return RawContent::Table { bbox, body };
            }
            None => {
                log::warn!("Sectionizer: unreadable table marker {:?}, keeping as text", &caps[1]);
            }
        }
    }
    RawContent::Text(segment.trim_matches('\n').to_string())
}
