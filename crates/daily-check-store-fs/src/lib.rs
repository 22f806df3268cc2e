//! File-backed key-value storage for daily-check.
//!
//! Every key maps to one `<key>.json` file inside the data directory. Writes go
//! through a temporary file in the same directory that is then renamed over
//! the document, so a crash never leaves a half-written document behind.

mod error;

pub use error::FsStoreError;

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (and create if needed) the data directory at `root`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, FsStoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| FsStoreError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document stored under `key`.
    ///
    /// # Errors
    /// Returns [`FsStoreError::InvalidKey`] for keys that are not plain names.
    pub fn document_path(&self, key: &str) -> Result<PathBuf, FsStoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(FsStoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }

    /// Read the document stored under `key`, or `None` when it was never written.
    ///
    /// # Errors
    /// Returns an error if the key is invalid or the file cannot be read.
    pub fn load(&self, key: &str) -> Result<Option<String>, FsStoreError> {
        let path = self.document_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), bytes = contents.len(), "Loaded document");
                Ok(Some(contents))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Document absent");
                Ok(None)
            }
            Err(source) => Err(FsStoreError::Io { path, source }),
        }
    }

    /// Replace the document stored under `key`.
    ///
    /// # Errors
    /// Returns an error if the key is invalid or the document cannot be written.
    pub fn save(&self, key: &str, contents: &str) -> Result<(), FsStoreError> {
        let path = self.document_path(key)?;
        let io_err = |source| FsStoreError::Io {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(io_err)?;
        tmp.write_all(contents.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&path).map_err(|source| FsStoreError::Persist {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), bytes = contents.len(), "Saved document");
        Ok(())
    }
}
