//! Schema inference options.

/// Options for schema inference.
#[derive(Debug, Clone)]
pub struct SchemaOptions {
    /// Data source identifier stamped on every publication
    pub data_source_id: String,

    /// Field names never emitted directly (their contents are still walked)
    pub skip_keys: Vec<String>,

    /// Field names whose string values are always typed `int`
    pub currency_keys: Vec<String>,

    /// Annotation tag marking monetary spans
    pub money_tag: String,

    /// Row field holding a line item's number
    pub line_number_key: String,

    /// Prefix of the synthetic key a line item is hoisted under
    pub line_key_prefix: String,

    /// Document identity used when the filename is blank
    pub unknown_identity: String,
}

impl SchemaOptions {
    /// Create new schema options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data source identifier.
    pub fn with_data_source(mut self, id: impl Into<String>) -> Self {
        self.data_source_id = id.into();
        self
    }

    /// Replace the skip list.
    pub fn with_skip_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.skip_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Add a field name to the skip list.
    pub fn skip_key(mut self, key: impl Into<String>) -> Self {
        self.skip_keys.push(key.into());
        self
    }

    /// Replace the currency field names.
    pub fn with_currency_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.currency_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set the monetary annotation tag.
    pub fn with_money_tag(mut self, tag: impl Into<String>) -> Self {
        self.money_tag = tag.into();
        self
    }

    /// Set the line-number field name.
    pub fn with_line_number_key(mut self, key: impl Into<String>) -> Self {
        self.line_number_key = key.into();
        self
    }

    /// Set the identity used for documents without a filename.
    pub fn with_unknown_identity(mut self, identity: impl Into<String>) -> Self {
        self.unknown_identity = identity.into();
        self
    }

    /// Check if a field name is on the skip list.
    pub fn is_skipped(&self, key: &str) -> bool {
        self.skip_keys.iter().any(|k| k == key)
    }

    /// Check if a field name is a currency field.
    pub fn is_currency_key(&self, key: &str) -> bool {
        self.currency_keys.iter().any(|k| k == key)
    }
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            data_source_id: String::new(),
            skip_keys: [
                "header",
                "header_items",
                "items",
                "meta_header",
                "meta_headers",
                "inner",
                "store:",
                "ship_to",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            currency_keys: ["price", "amount", "quantity"]
                .into_iter()
                .map(String::from)
                .collect(),
            money_tag: "MONEY".to_string(),
            line_number_key: "Line #".to_string(),
            line_key_prefix: "Line ".to_string(),
            unknown_identity: "unknown_file".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SchemaOptions::default();
        assert!(options.is_skipped("meta_headers"));
        assert!(options.is_skipped("store:"));
        assert!(!options.is_skipped("total"));
        assert!(options.is_currency_key("price"));
        assert_eq!(options.money_tag, "MONEY");
    }

    #[test]
    fn test_builder() {
        let options = SchemaOptions::new()
            .with_data_source("ds-42")
            .skip_key("misc")
            .with_currency_keys(["total"])
            .with_unknown_identity("anon");
        assert_eq!(options.data_source_id, "ds-42");
        assert!(options.is_skipped("misc"));
        assert!(options.is_currency_key("total"));
        assert!(!options.is_currency_key("price"));
        assert_eq!(options.unknown_identity, "anon");
    }
}
