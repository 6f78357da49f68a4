//! Schema inference and change detection.

use std::sync::Arc;

use crate::error::Result;
use crate::model::{DocumentSection, ReconstructedDocument, Row, Value, INNER_KEY};

use super::annotation::AnnotationSource;
use super::fingerprint::{Fingerprint, FingerprintKey, FingerprintStore};
use super::node::{Properties, SchemaNode, SchemaType};
use super::options::SchemaOptions;
use super::publish::{SchemaPublication, SchemaSink};

/// Section field holding table rows.
const ITEMS_KEY: &str = "items";

/// Result of inferring a document's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaOutcome {
    /// The schema differs from the last one seen for this topic and document
    pub changed: bool,
    /// Inferred schema, ready to publish
    pub publication: SchemaPublication,
    /// Fingerprint of `publication`
    pub fingerprint: Fingerprint,
}

impl SchemaOutcome {
    /// The publication, only if it changed.
    pub fn into_publication(self) -> Option<SchemaPublication> {
        self.changed.then_some(self.publication)
    }
}

/// Infers field schemas from reconstructed documents and tracks changes.
pub struct SchemaEngine {
    options: SchemaOptions,
    store: Arc<FingerprintStore>,
}

impl SchemaEngine {
    /// Create an engine with its own unbounded fingerprint store.
    pub fn new(options: SchemaOptions) -> Self {
        Self::with_store(options, Arc::new(FingerprintStore::new()))
    }

    /// Create an engine sharing `store` with other engines.
    pub fn with_store(options: SchemaOptions, store: Arc<FingerprintStore>) -> Self {
        Self { options, store }
    }

    /// Get the options in use.
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Get the fingerprint store.
    pub fn store(&self) -> &Arc<FingerprintStore> {
        &self.store
    }

    /// Document identity: the filename, or the unknown-identity sentinel.
    pub fn identity(&self, doc: &ReconstructedDocument) -> String {
        let name = doc.filename.trim();
        if name.is_empty() {
            self.options.unknown_identity.clone()
        } else {
            name.to_string()
        }
    }

    /// Infer field schemas for a section list. Does not touch the store.
    pub fn infer(&self, sections: &[DocumentSection], annotations: &AnnotationSource) -> Properties {
        let mut inference = Inference {
            options: &self.options,
            annotations,
            schema: Properties::new(),
        };
        for section in sections {
            section.for_each_field(|key, value| inference.top_level(key, value));
        }
        inference.schema
    }

    /// Infer the schema of `doc` under `topic` and record its fingerprint.
    pub fn detect(
        &self,
        doc: &ReconstructedDocument,
        annotations: &AnnotationSource,
        topic: &str,
    ) -> Result<SchemaOutcome> {
        let key = FingerprintKey::new(topic, self.identity(doc));
        self.detect_keyed(doc, annotations, &key)
    }

    /// Like [`detect`](Self::detect), handing a changed schema to `sink`.
    ///
    /// If the sink fails, the fingerprint is forgotten so the next call
    /// reports the schema as changed again.
    pub fn infer_and_publish(
        &self,
        doc: &ReconstructedDocument,
        annotations: &AnnotationSource,
        topic: &str,
        sink: &dyn SchemaSink,
    ) -> Result<SchemaOutcome> {
        let key = FingerprintKey::new(topic, self.identity(doc));
        let outcome = self.detect_keyed(doc, annotations, &key)?;
        if outcome.changed {
            if let Err(e) = sink.publish(&outcome.publication) {
                log::warn!(
                    "SchemaEngine: publishing {}/{} failed: {}",
                    key.topic,
                    key.identity,
                    e
                );
                self.store.remove(&key)?;
                return Err(e);
            }
        }
        Ok(outcome)
    }

    fn detect_keyed(
        &self,
        doc: &ReconstructedDocument,
        annotations: &AnnotationSource,
        key: &FingerprintKey,
    ) -> Result<SchemaOutcome> {
        let properties = self.infer(doc.sections(), annotations);
        let publication =
            SchemaPublication::new(self.options.data_source_id.clone(), key.topic.clone(), properties);
        let fingerprint = publication.fingerprint()?;
        let changed = self.store.check_and_update(key, fingerprint)?;

        if changed {
            log::info!(
                "SchemaEngine: schema for {}/{} changed ({})",
                key.topic,
                key.identity,
                fingerprint
            );
        } else {
            log::debug!("SchemaEngine: schema for {}/{} unchanged", key.topic, key.identity);
        }

        Ok(SchemaOutcome {
            changed,
            publication,
            fingerprint,
        })
    }
}

/// Walk state for one document.
struct Inference<'a> {
    options: &'a SchemaOptions,
    annotations: &'a AnnotationSource,
    schema: Properties,
}

impl Inference<'_> {
    /// A section field: emitted (last section wins), then walked.
    fn top_level(&mut self, key: &str, value: &Value) {
        if !self.options.is_skipped(key) {
            let node = self.node(Some(key), value);
            self.schema.insert(key.to_string(), node);
        }
        if key == ITEMS_KEY {
            self.hoist_line_items(value);
        }
        self.descend(value);
    }

    /// Give every row carrying a line number its own `Line <n>` object.
    fn hoist_line_items(&mut self, items: &Value) {
        let Value::List(items) = items else {
            return;
        };
        for item in items {
            let Value::Row(row) = item else {
                continue;
            };
            let Some(number) = row.get(&self.options.line_number_key) else {
                continue;
            };
            if number.is_blank() {
                continue;
            }

            let line_key = format!("{}{}", self.options.line_key_prefix, number);
            let mut fields = Properties::new();
            for (key, value) in row.fields() {
                if *key == self.options.line_number_key || self.options.is_skipped(key) {
                    continue;
                }
                fields.insert(key.clone(), self.node(Some(key.as_str()), value));
            }

            let entry = self
                .schema
                .entry(line_key)
                .or_insert_with(SchemaNode::object);
            if entry.properties().is_none() {
                *entry = SchemaNode::object();
            }
            if let Some(properties) = entry.properties_mut() {
                properties.extend(fields);
            }
        }
    }

    fn descend(&mut self, value: &Value) {
        match value {
            Value::List(items) => items.iter().for_each(|v| self.descend(v)),
            Value::Row(row) => self.descend_row(row),
            _ => {}
        }
    }

    /// Row fields are emitted only when no earlier field took the name.
    fn descend_row(&mut self, row: &Row) {
        for (key, value) in row.fields() {
            if !self.options.is_skipped(key) && !self.schema.contains_key(key) {
                let node = self.node(Some(key.as_str()), value);
                self.schema.insert(key.clone(), node);
            }
            self.descend(value);
        }
        if let Some(inner) = row.inner() {
            inner.iter().for_each(|r| self.descend_row(r));
        }
    }

    fn node(&self, key: Option<&str>, value: &Value) -> SchemaNode {
        match value {
            Value::List(items) => SchemaNode::List {
                context: None,
                items: if items.is_empty() {
                    None
                } else {
                    Some(items.iter().map(|v| self.node(None, v)).collect())
                },
            },
            Value::Row(row) => {
                let mut properties: Properties = row
                    .fields()
                    .iter()
                    .map(|(k, v)| (k.clone(), self.node(Some(k.as_str()), v)))
                    .collect();
                if let Some(inner) = row.inner() {
                    let rows = inner.iter().cloned().map(Value::Row).collect();
                    properties.insert(INNER_KEY.to_string(), self.node(None, &Value::List(rows)));
                }
                SchemaNode::Object { properties }
            }
            scalar => {
                let context = self
                    .annotations
                    .context_for(&scalar.to_string())
                    .map(str::to_string);
                let kind = self.scalar_type(key, scalar, context.as_deref());
                SchemaNode::Scalar { kind, context }
            }
        }
    }

    fn scalar_type(&self, key: Option<&str>, value: &Value, context: Option<&str>) -> SchemaType {
        match value {
            Value::String(s) => {
                let s = s.trim();
                let is_money = key.map_or(false, |k| self.options.is_currency_key(k))
                    || context == Some(self.options.money_tag.as_str());
                if is_money || is_digits(s) || is_decimal(s) {
                    SchemaType::Int
                } else {
                    SchemaType::String
                }
            }
            Value::Integer(_) | Value::Float(_) => SchemaType::Int,
            Value::Boolean(_) => SchemaType::Boolean,
            Value::Date(_) => SchemaType::String,
            Value::List(_) => SchemaType::List,
            Value::Row(_) => SchemaType::Object,
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(s: &str) -> bool {
    s.split_once('.')
        .map_or(false, |(whole, frac)| is_digits(whole) && is_digits(frac))
}
