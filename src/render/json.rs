//! JSON rendering for reconstructed documents and schema publications.

use serde::Serialize;

use crate::error::Result;
use crate::model::ReconstructedDocument;
use crate::schema::SchemaPublication;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn render<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Convert a reconstructed document to JSON.
///
/// The output is `{filename, main_json, header_key, header_only}`; statistics
/// are not included.
pub fn to_json(doc: &ReconstructedDocument, format: JsonFormat) -> Result<String> {
    render(doc, format)
}

/// Convert a schema publication to JSON.
pub fn publication_to_json(publication: &SchemaPublication, format: JsonFormat) -> Result<String> {
    render(publication, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentSection, Row, Shape, TableSection};
    use crate::schema::Properties;

    fn doc() -> ReconstructedDocument {
        let table = TableSection::new(
            Shape::HeaderValue,
            vec![Row::from_pairs([("Code", "ZIP"), ("Value", "95124")])],
        );
        ReconstructedDocument::new("zip.pdf", vec![DocumentSection::Table(table)])
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&doc(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"main_json\""));
        assert!(json.contains("\"header_value\""));
        assert!(json.contains('\n'));
        assert!(!json.contains("stats"));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&doc(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with(r#"{"filename":"zip.pdf","main_json":[{"kind":"table""#));
    }

    #[test]
    fn test_publication_to_json() {
        let publication = SchemaPublication::new("ds", "zip", Properties::new());
        let json = publication_to_json(&publication, JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"{"data_source_id":"ds","schemas":[{"name":"zip","type":"object","properties":{}}]}"#
        );
    }
}
