//! Error types for civics
//!
//! Storage and catalog errors. None of the store errors are fatal: callers
//! degrade to defaults on read and to in-memory state on write.

use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum CivicsError {
    #[error("Storage read error: {0}")]
    StorageRead(String),

    #[error("Storage write error: {0}")]
    StorageWrite(String),

    #[error("Malformed value for '{key}': {reason}")]
    Malformed { key: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CivicsError {
    /// Build a `Malformed` error for a storage key
    pub fn malformed(key: &str, reason: impl ToString) -> Self {
        CivicsError::Malformed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for civics
pub type Result<T> = std::result::Result<T, CivicsError>;
