use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate conference id '{0}'")]
    DuplicateId(String),
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("storage quota exceeded writing '{key}': {size} bytes over a {limit} byte limit")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
