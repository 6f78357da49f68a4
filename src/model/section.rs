//! Document sections: reconstructed tables and parsed prose blocks.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::{Row, Value};

/// Structural classification of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Alternating key row / value row pairs, reconstructed as one record
    HeaderValue,
    /// Outer rows carrying inner tables
    Nested,
    /// Rectangular body with optional meta rows above and summary rows below
    MetaHeader,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::HeaderValue => "header_value",
            Shape::Nested => "nested",
            Shape::MetaHeader => "meta_header",
        };
        f.write_str(name)
    }
}

/// A reconstructed table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSection {
    /// Table shape
    pub shape: Shape,

    /// Records in reading order
    #[serde(rename = "items")]
    pub rows: Vec<Row>,

    /// Verbatim meta fragments popped off above the body, `;`-joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_headers: Option<String>,

    /// Scalar key/value pairs parsed from meta and summary rows
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl TableSection {
    /// Keys a serialized table already uses next to its flattened `fields`.
    pub const RESERVED_KEYS: &'static [&'static str] = &["kind", "shape", "items", "meta_headers"];

    /// Rename a parsed field key that would collide with [`Self::RESERVED_KEYS`].
    pub fn unreserved_key(key: String) -> String {
        unreserved(key, Self::RESERVED_KEYS)
    }

    /// Create a table with the given shape and rows.
    pub fn new(shape: Shape, rows: Vec<Row>) -> Self {
        Self {
            shape,
            rows,
            meta_headers: None,
            fields: IndexMap::new(),
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Field names of the first row (the table header), excluding `inner`.
    pub fn header(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|r| r.field_names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Check whether every row exposes the same field names as the first row.
    pub fn is_uniform(&self) -> bool {
        let header = self.header();
        self.rows
            .iter()
            .all(|r| r.field_names().eq(header.iter().map(String::as_str)))
    }
}

/// A parsed prose block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextSection {
    /// Text of the top-level heading, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Paragraphs following the top-level heading
    #[serde(rename = "header_items", skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,

    /// Lines that belong to no heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc: Option<Vec<String>>,

    /// Fields named after emphasized headings (plus `reference_id`)
    #[serde(flatten)]
    pub fields: IndexMap<String, Value>,
}

impl TextSection {
    /// Keys a serialized text section already uses next to its flattened `fields`.
    pub const RESERVED_KEYS: &'static [&'static str] = &["kind", "header", "header_items", "misc"];

    /// Rename a parsed field key that would collide with [`Self::RESERVED_KEYS`].
    pub fn unreserved_key(key: String) -> String {
        unreserved(key, Self::RESERVED_KEYS)
    }

    /// Create an empty text section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.header.is_none()
            && self.items.is_empty()
            && self.misc.as_ref().map_or(true, Vec::is_empty)
            && self.fields.is_empty()
    }
}

/// Suffix `key` with `_2`, `_3`, ... until it is not in `reserved`.
fn unreserved(key: String, reserved: &[&str]) -> String {
    if !reserved.contains(&key.as_str()) {
        return key;
    }
    let mut n = 2;
    let mut candidate = format!("{}_{}", key, n);
    while reserved.contains(&candidate.as_str()) {
        n += 1;
        candidate = format!("{}_{}", key, n);
    }
    log::debug!("field key '{}' is reserved, using '{}'", key, candidate);
    candidate
}

/// One ordered unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentSection {
    /// Parsed prose
    Text(TextSection),
    /// Reconstructed table
    Table(TableSection),
}

impl DocumentSection {
    /// Borrow the table, if this is a table section.
    pub fn as_table(&self) -> Option<&TableSection> {
        match self {
            DocumentSection::Table(t) => Some(t),
            DocumentSection::Text(_) => None,
        }
    }

    /// Mutably borrow the table, if this is a table section.
    pub fn as_table_mut(&mut self) -> Option<&mut TableSection> {
        match self {
            DocumentSection::Table(t) => Some(t),
            DocumentSection::Text(_) => None,
        }
    }

    /// Borrow the text, if this is a text section.
    pub fn as_text(&self) -> Option<&TextSection> {
        match self {
            DocumentSection::Text(t) => Some(t),
            DocumentSection::Table(_) => None,
        }
    }

    /// Visit the section's named fields in serialized order, as `(key, value)`.
    ///
    /// Structural members are exposed under their serialized names
    /// (`items`, `meta_headers`, `header`, `header_items`, `misc`).
    pub fn for_each_field(&self, mut f: impl FnMut(&str, &Value)) {
        match self {
            DocumentSection::Table(t) => {
                let items = Value::List(t.rows.iter().cloned().map(Value::Row).collect());
                f("items", &items);
                if let Some(meta) = &t.meta_headers {
                    f("meta_headers", &Value::String(meta.clone()));
                }
                t.fields.iter().for_each(|(k, v)| f(k, v));
            }
            DocumentSection::Text(t) => {
                if let Some(header) = &t.header {
                    f("header", &Value::String(header.clone()));
                }
                if !t.items.is_empty() {
                    f("header_items", &Value::list(t.items.iter().cloned()));
                }
                if let Some(misc) = &t.misc {
                    f("misc", &Value::list(misc.iter().cloned()));
                }
                t.fields.iter().for_each(|(k, v)| f(k, v));
            }
        }
    }

    /// Every key and leaf value, depth-first.
    pub fn key_terms(&self) -> Vec<String> {
        let mut terms = Vec::new();
        self.for_each_field(|key, value| {
            terms.push(key.to_string());
            value.collect_terms(&mut terms);
        });
        terms
    }

    /// Structural keys only: top-level keys, with `items` replaced by the
    /// first row's field names (and its first nested row's names).
    pub fn structural_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        match self {
            DocumentSection::Table(t) => {
                if let Some(first) = t.rows.first() {
                    first.collect_structural_keys(&mut keys);
                }
                if t.meta_headers.is_some() {
                    keys.push("meta_headers".to_string());
                }
                keys.extend(t.fields.keys().cloned());
            }
            DocumentSection::Text(_) => {
                self.for_each_field(|key, _| keys.push(key.to_string()));
            }
        }
        keys
    }
}
