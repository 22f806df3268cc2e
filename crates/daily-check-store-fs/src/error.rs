//! Error types for daily-check file store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during `FsStore` operations.
#[derive(Error, Debug)]
pub enum FsStoreError {
    /// Key contains characters that cannot be used in a file name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The data directory could not be created or read.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The temporary file could not replace the document.
    #[error("Failed to replace {path}: {source}")]
    Persist {
        /// Document path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: tempfile::PersistError,
    },
}
