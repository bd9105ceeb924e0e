//! In-memory document store
//!
//! Keeps documents in insertion order behind a `RwLock`. Ids are 20
//! alphanumeric characters, the same shape Firestore auto-ids have.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::{Document, DocumentStore, StoreError, StoreResult};

/// Length of generated document ids
pub const AUTO_ID_LENGTH: usize = 20;

/// Process-local store
#[derive(Debug)]
pub struct InMemoryStore {
    /// Documents in insertion order
    documents: RwLock<Vec<(String, Document)>>,

    /// When false every operation fails as if the store were unreachable
    available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the store going away (or coming back)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store offline".to_string()))
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<(String, Document)>>> {
        self.documents
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<(String, Document)>>> {
        self.documents
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn generate_id(existing: &[(String, Document)]) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(AUTO_ID_LENGTH)
                .map(char::from)
                .collect();
            if !existing.iter().any(|(k, _)| *k == id) {
                return id;
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn put(&self, fields: Document) -> StoreResult<String> {
        self.check_available()?;
        let mut docs = self.write()?;
        let id = Self::generate_id(&docs);
        docs.push((id.clone(), fields));
        Ok(id)
    }

    async fn stream_all(&self) -> StoreResult<Vec<(String, Document)>> {
        self.check_available()?;
        Ok(self.read()?.clone())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        self.check_available()?;
        let docs = self.read()?;
        Ok(docs.iter().find(|(k, _)| k == id).map(|(_, d)| d.clone()))
    }

    async fn merge(&self, id: &str, fields: Document) -> StoreResult<()> {
        self.check_available()?;
        let mut docs = self.write()?;
        let (_, doc) = docs
            .iter_mut()
            .find(|(k, _)| k == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        doc.extend(fields);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.check_available()?;
        self.write()?.retain(|(k, _)| k != id);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(pairs: &[(&str, &str)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_put_assigns_distinct_ids() {
        let store = InMemoryStore::new();
        let a = store.put(doc(&[("Name", "A")])).await.unwrap();
        let b = store.put(doc(&[("Name", "B")])).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), AUTO_ID_LENGTH);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_stream_all_keeps_insertion_order() {
        let store = InMemoryStore::new();
        for name in ["first", "second", "third"] {
            store.put(doc(&[("Name", name)])).await.unwrap();
        }
        let names: Vec<String> = store
            .stream_all()
            .await
            .unwrap()
            .into_iter()
            .map(|(_, d)| d["Name"].clone())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_merge_keeps_other_keys() {
        let store = InMemoryStore::new();
        let id = store
            .put(doc(&[("Name", "A"), ("Extra", "kept")]))
            .await
            .unwrap();
        store.merge(&id, doc(&[("Name", "B")])).await.unwrap();
        let stored = store.get(&id).await.unwrap().unwrap();
        assert_eq!(stored["Name"], "B");
        assert_eq!(stored["Extra"], "kept");
    }

    #[tokio::test]
    async fn test_merge_missing_document() {
        let store = InMemoryStore::new();
        let err = store.merge("nope", doc(&[("Name", "B")])).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryStore::new();
        let id = store.put(doc(&[("Name", "A")])).await.unwrap();
        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_operation() {
        let store = InMemoryStore::new();
        store.set_available(false);
        assert!(matches!(
            store.stream_all().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.put(Document::new()).await.is_err());
        assert!(store.delete("x").await.is_err());

        store.set_available(true);
        assert!(store.stream_all().await.unwrap().is_empty());
    }
}
