use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Path '{key}' escapes base '{}'", .base.display())]
    PathEscape { key: String, base: PathBuf },

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error(transparent)]
    BatchDelete(#[from] BatchDeleteError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid storage configuration: {0}")]
    ConfigError(String),

    #[error("Size mismatch for '{key}': expected {expected} bytes, wrote {written}")]
    SizeMismatch {
        key: String,
        expected: u64,
        written: u64,
    },

    #[error("Path error: {0}")]
    PathError(#[from] backstore_utils::UtilsError),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

/// One failed key of a batch operation
#[derive(Debug)]
pub struct KeyError {
    pub key: String,
    pub error: StorageError,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

/// Aggregate result of a batch that finished with at least one failed key.
/// `failures` keeps input order.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct BatchDeleteError {
    pub message: String,
    pub failures: Vec<KeyError>,
}

impl BatchDeleteError {
    /// Keys that are still present after the batch
    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|failure| failure.key.as_str())
    }
}
