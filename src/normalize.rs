//! Leaf value normalization.
//!
//! Reconstruction yields strings everywhere. This pass walks the value tree
//! and replaces strings that look like dates or numbers with typed scalars.
//! Running it twice is a no-op.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::model::{DocumentSection, Row, Value};

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid regex"))
}

fn number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[$€£]?\s*(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?$").expect("valid regex")
    })
}

/// Try to read `M/D/YYYY`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = date_pattern().captures(text.trim())?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Try to read an optionally currency-prefixed number.
///
/// Returns `Integer` when there is no decimal point, `Float` otherwise.
pub fn parse_number(text: &str) -> Option<Value> {
    let caps = number_pattern().captures(text.trim())?;
    let whole = caps[1].replace(',', "");
    match caps.get(2) {
        Some(fraction) => format!("{}{}", whole, fraction.as_str())
            .parse::<f64>()
            .ok()
            .map(Value::Float),
        None => whole.parse::<i64>().ok().map(Value::Integer),
    }
}

/// Coerce a single string.
pub fn normalize_str(text: &str) -> Option<Value> {
    if let Some(date) = parse_date(text) {
        return Some(Value::Date(date));
    }
    parse_number(text)
}

/// Normalize a value tree in place.
pub fn normalize_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            if let Some(typed) = normalize_str(s) {
                *value = typed;
            }
        }
        Value::List(items) => items.iter_mut().for_each(normalize_value),
        Value::Row(row) => normalize_row(row),
        Value::Integer(_) | Value::Float(_) | Value::Date(_) | Value::Boolean(_) => {}
    }
}

/// Normalize every field of a row, then its nested table.
pub fn normalize_row(row: &mut Row) {
    row.fields_mut().values_mut().for_each(normalize_value);
    if let Some(inner) = row.inner_mut() {
        inner.iter_mut().for_each(normalize_row);
    }
}

/// Normalize all sections of a document.
///
/// Structural strings (`header`, `header_items`, `misc`, `meta_headers`) stay
/// as text; only row fields and scalar fields are coerced.
pub fn normalize_sections(sections: &mut [DocumentSection]) {
    for section in sections {
        match section {
            DocumentSection::Table(table) => {
                table.rows.iter_mut().for_each(normalize_row);
                table.fields.values_mut().for_each(normalize_value);
            }
            DocumentSection::Text(text) => {
                text.fields.values_mut().for_each(normalize_value);
            }
        }
    }
}
