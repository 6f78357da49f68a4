//! Semantic annotation source.
//!
//! Annotations come from an external entity recognizer: the document text
//! plus a list of tagged spans (`MONEY`, `DATE`, `ORG`, ...). A field's
//! context is the tag of the first span whose value matches the field value.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A tagged span of document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Semantic tag
    #[serde(rename = "type", alias = "entity")]
    pub kind: String,
    /// Span text
    pub value: String,
    /// Start offset in the document text
    #[serde(default)]
    pub start: usize,
    /// End offset in the document text
    #[serde(default)]
    pub end: usize,
}

impl Entity {
    /// Create an entity without offsets.
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            start: 0,
            end: 0,
        }
    }
}

/// Annotated document text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSource {
    /// Text the entities were recognized in
    #[serde(rename = "docText", alias = "doc_text", default)]
    pub doc_text: String,
    /// Recognized entities, in recognition order
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl AnnotationSource {
    /// Create an annotation source.
    pub fn new(doc_text: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            doc_text: doc_text.into(),
            entities,
        }
    }

    /// Parse an annotation source from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Tag of the first entity matching `value`, if any.
    ///
    /// Both sides drop currency glyphs and trailing backslashes. Two numbers
    /// match by value (`"50"` matches `"$50.00"`); anything else must match
    /// exactly.
    pub fn context_for(&self, value: &str) -> Option<&str> {
        let target = MatchKey::new(value);
        self.entities
            .iter()
            .find(|e| MatchKey::new(&e.value) == target)
            .map(|e| e.kind.as_str())
    }
}

/// Comparable form of a span or field value.
#[derive(Debug)]
struct MatchKey {
    text: String,
    number: Option<f64>,
}

impl MatchKey {
    fn new(raw: &str) -> Self {
        let text: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '$' | '€' | '£'))
            .collect();
        let text = text.trim_end_matches('\\').trim().to_string();
        let number = text
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite());
        Self { text, number }
    }
}

impl PartialEq for MatchKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a == b,
            _ => self.text == other.text,
        }
    }
}
