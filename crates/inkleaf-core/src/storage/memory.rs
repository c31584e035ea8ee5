//! In-memory storage, used in tests and as a scratch backend.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::scene::Snapshot;
use crate::storage::{BoxFuture, Storage, StorageError, StorageResult};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, Snapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn save_document<'a>(
        &'a self,
        id: &'a str,
        snapshot: &'a Snapshot,
    ) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(async move {
            let mut documents = self
                .documents
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
            documents.insert(id.to_string(), snapshot.clone());
            Ok(())
        })
    }

    fn load_document<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<Snapshot>> {
        Box::pin(async move {
            let documents = self
                .documents
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
            documents
                .get(id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(id.to_string()))
        })
    }

    fn delete_document<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(async move {
            let mut documents = self
                .documents
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
            documents
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| StorageError::NotFound(id.to_string()))
        })
    }

    fn list_documents<'a>(&'a self) -> BoxFuture<'a, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let documents = self
                .documents
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
            Ok(documents.keys().cloned().collect())
        })
    }

    fn document_exists<'a>(&'a self, id: &'a str) -> BoxFuture<'a, StorageResult<bool>> {
        Box::pin(async move {
            let documents = self
                .documents
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {e}")))?;
            Ok(documents.contains_key(id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneStore;
    use std::future::Future;
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn block_on<F: Future>(fut: F) -> F::Output {
        fn noop(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            RawWaker::new(std::ptr::null(), &VTABLE)
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, noop, noop, noop);
        let waker = unsafe { Waker::from_raw(RawWaker::new(std::ptr::null(), &VTABLE)) };
        let mut cx = Context::from_waker(&waker);
        let mut fut = std::pin::pin!(fut);
        loop {
            match fut.as_mut().poll(&mut cx) {
                Poll::Ready(value) => return value,
                Poll::Pending => std::thread::yield_now(),
            }
        }
    }

    fn sample_snapshot(name: &str) -> Snapshot {
        let mut store = SceneStore::new();
        store.set_project_name(name);
        store.snapshot()
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let snapshot = sample_snapshot("notes");
        block_on(storage.save_document("notes", &snapshot)).unwrap();

        let loaded = block_on(storage.load_document("notes")).unwrap();
        assert_eq!(loaded.project_name, "notes");
        assert!(block_on(storage.document_exists("notes")).unwrap());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let storage = MemoryStorage::new();
        let err = block_on(storage.load_document("nope")).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_delete_and_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save_document("a", &sample_snapshot("a"))).unwrap();
        block_on(storage.save_document("b", &sample_snapshot("b"))).unwrap();

        let mut names = block_on(storage.list_documents()).unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);

        block_on(storage.delete_document("a")).unwrap();
        assert!(!block_on(storage.document_exists("a")).unwrap());
        assert!(block_on(storage.delete_document("a")).is_err());
    }
}
