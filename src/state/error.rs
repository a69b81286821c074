/// Error types for the artwork store

use std::path::PathBuf;
use thiserror::Error;

use crate::artwork::codec::CodecError;

/// Errors that can occur during artwork store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened
    #[error("Failed to connect to database at {path}: {reason}")]
    Connection { path: PathBuf, reason: String },

    /// The connection was already released with `close()`
    #[error("Database connection is closed")]
    Closed,

    /// Table setup failed, or an existing table lacks required columns
    #[error("Failed to initialize artworks table: {0}")]
    Schema(String),

    /// A required field is empty
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Image payload could not be encoded or decoded
    #[error("Image codec error: {0}")]
    Codec(#[from] CodecError),

    /// Generic remote failure (constraint, busy timeout, I/O)
    #[error("Database operation failed: {0}")]
    Persistence(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
