//! Leaf values and table rows.

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

/// A reconstructed value.
///
/// Reconstruction only produces `String`, `List` and `Row`; the remaining
/// variants appear after [`normalize`](crate::normalize::normalize_value).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Raw text
    String(String),
    /// Whole number
    Integer(i64),
    /// Decimal number
    Float(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Boolean flag
    Boolean(bool),
    /// Ordered list of values
    List(Vec<Value>),
    /// Nested record
    Row(Row),
}

impl Value {
    /// Borrow the text of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this is a string with no visible content.
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::String(s) if s.trim().is_empty())
    }

    /// Check if this is a scalar (not a list or row).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Row(_))
    }

    /// Build a list value from strings.
    pub fn list<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    /// Flatten this value into whitespace-separable terms (keys and leaves).
    pub(crate) fn collect_terms(&self, out: &mut Vec<String>) {
        match self {
            Value::List(items) => items.iter().for_each(|v| v.collect_terms(out)),
            Value::Row(row) => row.collect_terms(out),
            other => out.push(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
            Value::Row(row) => {
                let mut terms = Vec::new();
                row.collect_terms(&mut terms);
                f.write_str(&terms.join(" "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Row> for Value {
    fn from(row: Row) -> Self {
        Value::Row(row)
    }
}

/// Name of the reserved key holding a row's nested table.
pub const INNER_KEY: &str = "inner";

/// One record of a table: an ordered field map plus an optional nested table.
///
/// Field order is column order. The nested table (`inner`) is kept apart from
/// the fields so that every row of a table exposes the same field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    #[serde(flatten)]
    fields: IndexMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    inner: Option<Vec<Row>>,

    /// Stands in for the body of a header-only table.
    #[serde(skip)]
    anchor: bool,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from key/value pairs, in order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = Self::new();
        for (k, v) in pairs {
            row.insert(k, v);
        }
        row
    }

    /// Create a row with the given field names, every value an empty string.
    pub fn blank<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::from_pairs(names.into_iter().map(|n| (n.as_ref().to_string(), "")))
    }

    /// Create the blank row standing in for a table that has a header but no
    /// body.
    pub fn anchor<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            anchor: true,
            ..Self::blank(names)
        }
    }

    /// Check if this row was created by [`Row::anchor`] and is still blank.
    pub fn is_anchor(&self) -> bool {
        self.anchor && self.fields.values().all(Value::is_blank)
    }

    /// Insert or replace a field. Insertion order is preserved for new keys.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get a field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Check if the row has a field.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in column order (never includes `inner`).
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Borrow the field map.
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Mutably borrow the field map.
    pub fn fields_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Check if every listed field is present and blank.
    pub fn is_blank_under<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names
            .iter()
            .all(|n| self.get(n.as_ref()).map(Value::is_blank).unwrap_or(false))
    }

    /// Borrow the nested table, if any.
    pub fn inner(&self) -> Option<&[Row]> {
        self.inner.as_deref()
    }

    /// Mutably borrow the nested table, if any.
    pub fn inner_mut(&mut self) -> Option<&mut Vec<Row>> {
        self.inner.as_mut()
    }

    /// Attach a nested table, replacing any previous one.
    pub fn set_inner(&mut self, rows: Vec<Row>) {
        self.inner = Some(rows);
    }

    /// Detach and return the nested table.
    pub fn take_inner(&mut self) -> Option<Vec<Row>> {
        self.inner.take()
    }

    /// Collect keys and leaf values, depth-first.
    pub(crate) fn collect_terms(&self, out: &mut Vec<String>) {
        for (key, value) in &self.fields {
            out.push(key.clone());
            value.collect_terms(out);
        }
        if let Some(inner) = &self.inner {
            out.push(INNER_KEY.to_string());
            inner.iter().for_each(|r| r.collect_terms(out));
        }
    }

    /// Collect structural keys only: this row's field names, then the
    /// field names of the first nested row.
    pub(crate) fn collect_structural_keys(&self, out: &mut Vec<String>) {
        out.extend(self.fields.keys().cloned());
        if let Some(first) = self.inner.as_ref().and_then(|rows| rows.first()) {
            first.collect_structural_keys(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_preserves_order() {
        let row = Row::from_pairs([("PO", "1001"), ("Qty", "3"), ("Desc", "Bolts")]);
        let names: Vec<&str> = row.field_names().collect();
        assert_eq!(names, vec!["PO", "Qty", "Desc"]);
    }

    #[test]
    fn test_inner_is_not_a_field() {
        let mut row = Row::blank(["PO", "Qty"]);
        row.set_inner(vec![Row::from_pairs([("Item", "A")])]);
        assert_eq!(row.len(), 2);
        assert!(!row.contains_key(INNER_KEY));
        assert_eq!(row.inner().map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_anchor_row() {
        let mut row = Row::anchor(["PO", "Qty"]);
        assert!(row.is_anchor());
        assert!(row.is_blank_under(&["PO", "Qty"]));
        assert!(!Row::blank(["PO"]).is_anchor());

        row.insert("PO", "4500");
        assert!(!row.is_anchor());
    }

    #[test]
    fn test_is_blank_under() {
        let row = Row::from_pairs([("PO", ""), ("Qty", "  ")]);
        assert!(row.is_blank_under(&["PO", "Qty"]));
        assert!(!row.is_blank_under(&["PO", "Missing"]));
    }

    #[test]
    fn test_serialize_row_with_inner() {
        let mut row = Row::from_pairs([("PO", "1")]);
        row.set_inner(vec![Row::from_pairs([("Item", Value::Integer(2))])]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"PO":"1","inner":[{"Item":2}]}"#);
    }

    #[test]
    fn test_value_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(date).to_string(), "2024-03-09");
        assert_eq!(Value::Float(309.75).to_string(), "309.75");
        assert_eq!(Value::list(["a", "b"]).to_string(), "a b");
    }

    #[test]
    fn test_collect_terms() {
        let mut row = Row::from_pairs([("PO", "1")]);
        row.set_inner(vec![Row::from_pairs([("Item", "Bolt")])]);
        let mut terms = Vec::new();
        row.collect_terms(&mut terms);
        assert_eq!(terms, vec!["PO", "1", "inner", "Item", "Bolt"]);
    }
}
