//! In-memory object store
//!
//! Keeps every object in a map. Used by tests and by dry runs that should not
//! touch a real bucket.

use crate::storage::traits::{Metadata, ObjectStore, StorageError, StorageResult};
use crate::storage::ObjectBody;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// An object as held by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
    pub metadata: Metadata,
}

#[derive(Debug)]
pub struct MemoryStore {
    base_url: String,
    objects: Mutex<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a copy of the object stored under `key`
    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(key).cloned()
    }

    /// Inserts an object directly, bypassing [`ObjectStore::put`]
    pub async fn insert(&self, key: &str, object: StoredObject) {
        self.objects.lock().await.insert(key.to_string(), object);
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        body: ObjectBody,
        content_type: &str,
        metadata: Metadata,
    ) -> StorageResult<String> {
        // Body is read before the lock is taken
        let body = body.collect().await.map_err(|source| StorageError::Body {
            key: key.to_string(),
            source,
        })?;

        let object = StoredObject {
            body,
            content_type: content_type.to_string(),
            metadata,
        };
        self.objects.lock().await.insert(key.to_string(), object);

        Ok(self.location(key))
    }

    async fn head_metadata(&self, key: &str) -> StorageResult<Metadata> {
        self.objects
            .lock()
            .await
            .get(key)
            .map(|object| object.metadata.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn location(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
