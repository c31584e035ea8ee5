//! Persistence backends for scene snapshots.
//!
//! The [`Storage`] trait is async so embedders can plug in network or
//! browser backends; the bundled implementations are an in-memory map and
//! a JSON-file directory.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::scene::Snapshot;

pub mod autosave;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;
pub mod memory;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL, LAST_DOCUMENT_KEY};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An async key-value store of scene snapshots.
pub trait Storage: Send + Sync {
    fn save_document<'a>(
        &'a self,
        id: &'a str,
        snapshot: &'a Snapshot,
    ) -> BoxFuture<'a, StorageResult<()>>;

    fn load_document<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<Snapshot>>;

    fn delete_document<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<()>>;

    fn list_documents<'a>(&'a self) -> BoxFuture<'a, StorageResult<Vec<String>>>;

    fn document_exists<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<bool>>;
}

/// File storage rooted at the platform's local data directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<FileStorage> {
    FileStorage::default_location()
}
