//! Error type for the file-backed stores.
//!
//! Catalog, patient directory and operator accounts are read-only files
//! resolved at startup; failures to read or parse them surface as a
//! [`StoreError`] and are never retried.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read store file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write store file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse YAML store {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("failed to parse JSON store {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
