//! Process-local document store
//!
//! Used when `store = "memory"`: metadata never leaves the machine and is
//! gone when the process exits.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;

use crate::application::ports::{DocumentStore, StoreError};
use crate::domain::recording::{RecordingMetadata, RemoteId};

/// In-memory document store with ids `mem-<n>`
#[derive(Default)]
pub struct InMemoryStore {
    next_id: AtomicU64,
    collections: StdMutex<HashMap<String, BTreeMap<String, RecordingMetadata>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .map(|c| c.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Look up a stored document
    pub fn get(&self, collection: &str, id: &RemoteId) -> Option<RecordingMetadata> {
        self.collections
            .lock()
            .ok()?
            .get(collection)?
            .get(id.as_str())
            .cloned()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(
        &self,
        collection: &str,
        record: &RecordingMetadata,
    ) -> Result<RemoteId, StoreError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = RemoteId::new(format!("mem-{}", n))
            .map_err(|e| StoreError::ApiError(e.to_string()))?;

        let mut collections = self
            .collections
            .lock()
            .map_err(|e| StoreError::ApiError(e.to_string()))?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.as_str().to_string(), record.clone());

        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &RemoteId) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .lock()
            .map_err(|e| StoreError::ApiError(e.to_string()))?;

        collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id.as_str()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::DurationLabel;

    fn record(ms: u64) -> RecordingMetadata {
        RecordingMetadata::new(&DurationLabel::from_millis(ms), "file:///tmp/a.flac")
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let first = store.create("recordings", &record(1_000)).await.unwrap();
        let second = store.create("recordings", &record(2_000)).await.unwrap();

        assert_eq!(first.as_str(), "mem-1");
        assert_eq!(second.as_str(), "mem-2");
        assert_eq!(store.len("recordings"), 2);
        assert_eq!(store.get("recordings", &second).unwrap().duration, "0:02");
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = InMemoryStore::new();
        let id = store.create("recordings", &record(1_000)).await.unwrap();

        store.delete("recordings", &id).await.unwrap();
        assert!(store.is_empty("recordings"));
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let store = InMemoryStore::new();
        let id = RemoteId::new("mem-42").unwrap();
        let err = store.delete("recordings", &id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn collections_are_separate() {
        let store = InMemoryStore::new();
        let id = store.create("a", &record(1_000)).await.unwrap();

        assert!(store.is_empty("b"));
        assert!(store.delete("b", &id).await.is_err());
        assert_eq!(store.len("a"), 1);
    }
}
