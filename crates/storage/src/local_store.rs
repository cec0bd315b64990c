//! Namespaced key/value storage for client-held state, in the spirit of a
//! browser's `localStorage`: string values under flat string keys.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::debug;

use crate::error::{Result, StorageError};

pub trait LocalStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// One JSON file per key under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl LocalStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StorageError::io(path, error)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root).map_err(|error| StorageError::io(&self.root, error))?;

        // Write-then-rename so a crash never leaves a truncated value behind.
        let staging = self.root.join(format!(".{key}.json.tmp"));
        fs::write(&staging, value).map_err(|error| StorageError::io(&staging, error))?;
        fs::rename(&staging, &path).map_err(|error| StorageError::io(&path, error))?;
        debug!(path = %path.display(), bytes = value.len(), "stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(StorageError::io(path, error)),
        }
    }
}

/// In-memory store with an optional per-value size quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocalStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        if let Some(limit) = self.quota_bytes {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.items().remove(key);
        Ok(())
    }
}
