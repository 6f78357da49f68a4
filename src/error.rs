//! Error types for unform library.

use std::io;
use thiserror::Error;

/// Result type alias for unform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing documents and inferring schemas.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A grid or section cannot be classified cleanly (ragged rows,
    /// mismatched header counts, malformed table markers).
    #[error("Structural ambiguity: {0}")]
    StructuralAmbiguity(String),

    /// The page-layout oracle failed or returned nothing where a table was expected.
    #[error("Layout oracle error: {0}")]
    Oracle(String),

    /// The input cannot be opened as a paginated document at all.
    #[error("Unparseable document: {0}")]
    UnparseableDocument(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A shared lock was poisoned by a panicking thread.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the reconstruction pipeline may recover from this error locally
    /// (by dropping a row or degrading to a heuristic parser).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::StructuralAmbiguity(_) | Error::Oracle(_))
    }
}
