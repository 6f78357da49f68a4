//! Data model for reconstructed documents.
//!
//! Reconstruction turns a page stream into an ordered list of
//! [`DocumentSection`]s. Tables hold [`Row`]s of [`Value`]s; values start out
//! as strings and are replaced in place by the normalizer.

mod document;
mod geometry;
mod section;
mod value;

pub use document::{ReconstructedDocument, ReconstructionStats};
pub use geometry::BBox;
pub use section::{DocumentSection, Shape, TableSection, TextSection};
pub use value::{Row, Value, INNER_KEY};
