//! Schema inference.
//!
//! Walks a reconstructed document, types every named field, tags it with the
//! semantic context found in an annotation source, and reports whether the
//! resulting schema changed since the last document with the same topic and
//! identity.

mod annotation;
mod engine;
mod fingerprint;
mod node;
mod options;
mod publish;

pub use annotation::{AnnotationSource, Entity};
pub use engine::{SchemaEngine, SchemaOutcome};
pub use fingerprint::{Fingerprint, FingerprintKey, FingerprintStore};
pub use node::{Properties, SchemaNode, SchemaType};
pub use options::SchemaOptions;
pub use publish::{SchemaPublication, SchemaSink, TopicSchema};
