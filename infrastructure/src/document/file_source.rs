//! Plain-text document files

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Cannot read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document {0} is empty")]
    Empty(PathBuf),
}

/// Reads the full text of a document file
pub struct FileDocumentSource;

impl FileDocumentSource {
    /// Read a UTF-8 text file (invalid sequences are replaced)
    pub fn read(path: impl AsRef<Path>) -> Result<String, DocumentError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes).into_owned();

        if text.trim().is_empty() {
            return Err(DocumentError::Empty(path.to_path_buf()));
        }

        debug!(path = %path.display(), bytes = text.len(), "Document loaded");
        Ok(text)
    }
}
