//! Schema Contract files
//!
//! TOML:
//!
//! ```toml
//! [[fields]]
//! name = "sample_size"
//! label = "Sample size"
//! type = "integer"
//! description = "Number of randomized participants"
//! ```
//!
//! JSON: either `{"fields": [...]}` or a bare array of fields.

use extract_domain::{DomainError, Field, SchemaContract};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaLoadError {
    #[error("Cannot read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML schema: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid schema: {0}")]
    Invalid(#[from] DomainError),

    #[error("Unsupported schema file extension: {0} (expected .toml or .json)")]
    UnsupportedFormat(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonSchemaFile {
    Fields(Vec<Field>),
    Object { fields: Vec<Field> },
}

/// Loads a [`SchemaContract`] from a file, choosing the format by extension
pub struct SchemaLoader;

impl SchemaLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<SchemaContract, SchemaLoadError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let content = fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_str() {
            "toml" => Self::from_toml(&content),
            "json" => Self::from_json(&content),
            other => Err(SchemaLoadError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_toml(content: &str) -> Result<SchemaContract, SchemaLoadError> {
        #[derive(Deserialize)]
        struct TomlSchemaFile {
            fields: Vec<Field>,
        }

        let file: TomlSchemaFile = toml::from_str(content)?;
        Ok(SchemaContract::new(file.fields)?)
    }

    pub fn from_json(content: &str) -> Result<SchemaContract, SchemaLoadError> {
        let fields = match serde_json::from_str(content)? {
            JsonSchemaFile::Fields(fields) => fields,
            JsonSchemaFile::Object { fields } => fields,
        };
        Ok(SchemaContract::new(fields)?)
    }
}
