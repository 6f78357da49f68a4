//! Schema publication contract and the sink it is handed to.

use serde::Serialize;

use crate::error::Result;

use super::fingerprint::Fingerprint;
use super::node::{Properties, SchemaType};

/// Schema of one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSchema {
    /// Topic name
    pub name: String,
    /// Always `object`
    #[serde(rename = "type")]
    pub kind: SchemaType,
    /// Field schemas
    pub properties: Properties,
}

/// Payload handed to the schema exporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaPublication {
    /// Data source the schemas belong to
    pub data_source_id: String,
    /// One schema per topic
    pub schemas: Vec<TopicSchema>,
}

impl SchemaPublication {
    /// Create a publication holding one topic schema.
    pub fn new(
        data_source_id: impl Into<String>,
        topic: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            data_source_id: data_source_id.into(),
            schemas: vec![TopicSchema {
                name: topic.into(),
                kind: SchemaType::Object,
                properties,
            }],
        }
    }

    /// Properties of the first topic schema.
    pub fn properties(&self) -> Option<&Properties> {
        self.schemas.first().map(|s| &s.properties)
    }

    /// Digest of the compact JSON serialization.
    ///
    /// Field order is insertion order, so equal schemas built from equal
    /// input always produce equal fingerprints.
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        let json = serde_json::to_string(self)?;
        Ok(Fingerprint::of(json.as_bytes()))
    }
}

/// Receives publications whose schema changed.
///
/// Transport (HTTP, queue, file) is up to the implementation.
pub trait SchemaSink {
    /// Publish a changed schema.
    fn publish(&self, publication: &SchemaPublication) -> Result<()>;
}

impl<F> SchemaSink for F
where
    F: Fn(&SchemaPublication) -> Result<()>,
{
    fn publish(&self, publication: &SchemaPublication) -> Result<()> {
        self(publication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::SchemaNode;

    #[test]
    fn test_publication_shape() {
        let mut properties = Properties::new();
        properties.insert(
            "total".to_string(),
            SchemaNode::Scalar {
                kind: SchemaType::Int,
                context: None,
            },
        );
        let publication = SchemaPublication::new("ds-1", "invoices", properties);
        let json = serde_json::to_value(&publication).unwrap();
        assert_eq!(json["data_source_id"], "ds-1");
        assert_eq!(json["schemas"][0]["name"], "invoices");
        assert_eq!(json["schemas"][0]["type"], "object");
        assert_eq!(json["schemas"][0]["properties"]["total"]["type"], "int");
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = SchemaPublication::new("ds", "t", Properties::new());
        let b = SchemaPublication::new("ds", "u", Properties::new());
        assert_eq!(a.fingerprint().unwrap(), a.clone().fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }
}
