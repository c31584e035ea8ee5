//! Debounced autosave over any [`Storage`] backend.
//!
//! The manager never blocks input handling: callers mark the scene dirty on
//! every commit and poll `maybe_save` from their idle loop; an actual write
//! happens at most once per interval.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::scene::{DEFAULT_PROJECT_NAME, Snapshot};
use crate::storage::{Storage, StorageResult};

/// Well-known key holding whatever was saved most recently, so the studio
/// can reopen where the user left off.
pub const LAST_DOCUMENT_KEY: &str = "__last_document__";

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Storage id for a snapshot, derived from its project name.
pub fn document_id(snapshot: &Snapshot) -> String {
    let name = snapshot.project_name.trim();
    if name.is_empty() {
        DEFAULT_PROJECT_NAME.to_string()
    } else {
        name.to_string()
    }
}

pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    current_doc_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_interval(storage, DEFAULT_AUTOSAVE_INTERVAL)
    }

    pub fn with_interval(storage: Arc<S>, interval: Duration) -> Self {
        Self {
            storage,
            interval,
            last_save: None,
            dirty: false,
            current_doc_id: None,
        }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn current_document(&self) -> Option<&str> {
        self.current_doc_id.as_deref()
    }

    /// Whether enough has changed, long enough ago, to warrant a write.
    pub fn should_save(&self) -> bool {
        self.dirty && self.last_save.is_none_or(|t| t.elapsed() >= self.interval)
    }

    /// Save if the debounce window has elapsed. Returns whether a write
    /// actually happened.
    pub async fn maybe_save(&mut self, snapshot: &Snapshot) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(snapshot).await?;
        Ok(true)
    }

    /// Save unconditionally, under both the document's own id and the
    /// last-document key.
    pub async fn save(&mut self, snapshot: &Snapshot) -> StorageResult<()> {
        let id = document_id(snapshot);
        self.storage.save_document(&id, snapshot).await?;
        self.storage.save_document(LAST_DOCUMENT_KEY, snapshot).await?;
        log::debug!("Autosaved document '{id}'");
        self.current_doc_id = Some(id);
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(())
    }

    pub async fn load(&mut self, id: &str) -> StorageResult<Snapshot> {
        let snapshot = self.storage.load_document(id).await?;
        self.current_doc_id = Some(id.to_string());
        self.dirty = false;
        Ok(snapshot)
    }

    /// Load whatever was saved most recently.
    pub async fn load_last(&mut self) -> StorageResult<Snapshot> {
        let snapshot = self.storage.load_document(LAST_DOCUMENT_KEY).await?;
        self.current_doc_id = Some(document_id(&snapshot));
        self.dirty = false;
        Ok(snapshot)
    }

    pub async fn delete(&mut self, id: &str) -> StorageResult<()> {
        self.storage.delete_document(id).await?;
        if self.current_doc_id.as_deref() == Some(id) {
            self.current_doc_id = None;
        }
        Ok(())
    }

    /// All stored documents, minus the last-document bookkeeping entry.
    pub async fn list_documents(&self) -> StorageResult<Vec<String>> {
        let ids = self.storage.list_documents().await?;
        Ok(ids.into_iter().filter(|id| id != LAST_DOCUMENT_KEY).collect())
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.document_exists(id).await
    }
}
