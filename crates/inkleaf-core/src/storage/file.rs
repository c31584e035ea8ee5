//! JSON-file storage under a documents directory.
//!
//! Each document is one pretty-named `.json` file; ids are sanitized so a
//! project name can never escape the directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::scene::Snapshot;
use crate::storage::{BoxFuture, Storage, StorageError, StorageResult};

#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(Self { base_path })
    }

    /// Storage under the platform's local data directory, falling back to
    /// the home directory.
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Other("Could not determine data directory".to_string()))?;
        Self::new(base.join("inkleaf").join("documents"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn document_path(&self, id: &str) -> PathBuf {
        let safe: String = id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{safe}.json"))
    }
}

impl Storage for FileStorage {
    fn save_document<'a>(
        &'a self,
        id: &'a str,
        snapshot: &'a Snapshot,
    ) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(async move {
            let json = snapshot
                .to_json()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(self.document_path(id), json).map_err(|e| StorageError::Io(e.to_string()))
        })
    }

    fn load_document<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<Snapshot>> {
        Box::pin(async move {
            let path = self.document_path(id);
            if !path.exists() {
                return Err(StorageError::NotFound(id.to_string()));
            }
            let json = fs::read_to_string(path).map_err(|e| StorageError::Io(e.to_string()))?;
            Snapshot::from_json(&json).map_err(|e| StorageError::Serialization(e.to_string()))
        })
    }

    fn delete_document<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(async move {
            let path = self.document_path(id);
            if !path.exists() {
                return Err(StorageError::NotFound(id.to_string()));
            }
            fs::remove_file(path).map_err(|e| StorageError::Io(e.to_string()))
        })
    }

    fn list_documents<'a>(&'a self) -> BoxFuture<'a, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries =
                fs::read_dir(&self.base_path).map_err(|e| StorageError::Io(e.to_string()))?;
            let mut ids = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|e| StorageError::Io(e.to_string()))?;
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        ids.push(stem.to_string());
                    }
                }
            }
            Ok(ids)
        })
    }

    fn document_exists<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<bool>> {
        Box::pin(async move { Ok(self.document_path(id).exists()) })
    }
}
