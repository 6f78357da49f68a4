//! Schema nodes.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Named schema nodes, in first-seen order.
pub type Properties = IndexMap<String, SchemaNode>;

/// Inferred type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// Text
    String,
    /// Any number, including money and decimals
    Int,
    /// Boolean flag
    Boolean,
    /// Ordered list
    List,
    /// Nested record
    Object,
}

/// A node of an inferred schema, mirroring the shape of the value it describes.
///
/// Serialized as `{"type", "context"}` plus `items` for containers: an array
/// of element nodes for a list, a map of field nodes for an object.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A leaf value
    Scalar {
        /// Leaf type
        kind: SchemaType,
        /// Semantic tag from the annotation source
        context: Option<String>,
    },
    /// A list; `items` is `None` for an empty list
    List {
        /// Semantic tag from the annotation source
        context: Option<String>,
        /// One node per element
        items: Option<Vec<SchemaNode>>,
    },
    /// A record
    Object {
        /// One node per field
        properties: Properties,
    },
}

impl SchemaNode {
    /// Create an empty object node.
    pub fn object() -> Self {
        SchemaNode::Object {
            properties: Properties::new(),
        }
    }

    /// Get the node type.
    pub fn kind(&self) -> SchemaType {
        match self {
            SchemaNode::Scalar { kind, .. } => *kind,
            SchemaNode::List { .. } => SchemaType::List,
            SchemaNode::Object { .. } => SchemaType::Object,
        }
    }

    /// Get the semantic tag, if any.
    pub fn context(&self) -> Option<&str> {
        match self {
            SchemaNode::Scalar { context, .. } | SchemaNode::List { context, .. } => {
                context.as_deref()
            }
            SchemaNode::Object { .. } => None,
        }
    }

    /// Get list element nodes.
    pub fn items(&self) -> Option<&[SchemaNode]> {
        match self {
            SchemaNode::List { items, .. } => items.as_deref(),
            _ => None,
        }
    }

    /// Get object properties.
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            SchemaNode::Object { properties } => Some(properties),
            _ => None,
        }
    }

    /// Mutably get object properties.
    pub fn properties_mut(&mut self) -> Option<&mut Properties> {
        match self {
            SchemaNode::Object { properties } => Some(properties),
            _ => None,
        }
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", &self.kind())?;
        map.serialize_entry("context", &self.context())?;
        match self {
            SchemaNode::Scalar { .. } => {}
            SchemaNode::List { items, .. } => map.serialize_entry("items", items)?,
            SchemaNode::Object { properties } => map.serialize_entry("items", properties)?,
        }
        map.end()
    }
}
