//! Conference catalog loading and client-side persisted state.

pub mod catalog;
pub mod error;
pub mod local_store;
pub mod preferences;

pub use catalog::{Catalog, CatalogIssue};
pub use error::{Result, StorageError};
pub use local_store::{FileStore, LocalStore, MemoryStore};
pub use preferences::PreferenceStore;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
