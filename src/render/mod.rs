//! Rendering module for the JSON contracts produced by this crate.

mod json;

pub use json::{publication_to_json, to_json, JsonFormat};
