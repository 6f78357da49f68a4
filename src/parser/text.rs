//! Prose block parsing.
//!
//! A prose block is split at heading markers: a bold run on its own line
//! (`**Ship To**`) or a top-level heading (`# Invoice`). Headings containing
//! digits are not markers.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{TextSection, Value};

/// Field holding the identifier paragraph of a top-level heading.
pub const REFERENCE_ID_KEY: &str = "reference_id";

fn heading_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*[^0-9\n]+\*\*\n|# [^0-9\n]+\n").expect("valid regex"))
}

fn digit_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d").expect("valid regex"))
}

/// Parse a prose block into a text section.
///
/// Lines before the first heading marker are kept in `misc`.
pub fn parse_text_section(block: &str) -> TextSection {
    let mut section = TextSection::new();
    // A heading on the final line still needs its newline to match.
    let text = format!("{}\n", block);

    let markers: Vec<_> = heading_pattern().find_iter(&text).collect();
    let preamble_end = markers.first().map_or(text.len(), |m| m.start());
    let misc: Vec<String> = text[..preamble_end]
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if !misc.is_empty() {
        section.misc = Some(misc);
    }

    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
        let heading = marker.as_str();
        let content = &text[marker.end()..end];

        if heading.starts_with("**") {
            parse_emphasized(&mut section, heading, content);
        } else {
            parse_top_level(&mut section, heading, content);
        }
    }

    section
}

/// `**Label**` followed by lines becomes a `label` field.
///
/// A blank line then a single line gives a string; anything else gives the
/// list of lines, blank lines included.
fn parse_emphasized(section: &mut TextSection, heading: &str, content: &str) {
    let name = heading
        .replace("**", "")
        .trim()
        .to_lowercase()
        .replace(' ', "_");
    if name.is_empty() {
        return;
    }

    let content = content.trim_end();
    let lines: Vec<&str> = if content.is_empty() {
        Vec::new()
    } else {
        content.split('\n').map(str::trim).collect()
    };
    let value = match lines.as_slice() {
        ["", value] => Value::String(value.to_string()),
        _ => Value::list(lines),
    };
    section.fields.insert(TextSection::unreserved_key(name), value);
}

/// `# Title` followed by paragraphs sets `header` and `header_items`.
fn parse_top_level(section: &mut TextSection, heading: &str, content: &str) {
    let title = heading.trim_start_matches('#').trim();
    section.header = Some(title.to_string());

    let paragraphs: Vec<String> = content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    for paragraph in &paragraphs {
        if digit_pattern().is_match(paragraph) && !paragraph.contains('/') {
            section.fields.insert(
                REFERENCE_ID_KEY.to_string(),
                Value::String(paragraph.to_lowercase()),
            );
        }
    }
    if !paragraphs.is_empty() {
        section.items = paragraphs;
    }
}
