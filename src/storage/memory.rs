use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{matches, Document, Storage, StorageError};

/// In-memory document store. Backs the test suite and works as a throwaway
/// runtime backend; nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    // collection name -> documents in insertion order
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn insert(&self, collection: &str, mut doc: Document) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        doc.insert("id".to_string(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);

        Ok(id)
    }

    async fn find_many(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Vec<Document>, StorageError> {
        let collections = self.collections.read().await;
        let docs = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        Ok(docs
            .iter()
            .filter(|doc| matches(doc, filter))
            .cloned()
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Document,
        patch: &Document,
    ) -> Result<(), StorageError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or(StorageError::NotFound)?;
        let doc = docs
            .iter_mut()
            .find(|doc| matches(doc, filter))
            .ok_or(StorageError::NotFound)?;

        for (key, value) in patch {
            doc.insert(key.clone(), value.clone());
        }

        Ok(())
    }

    async fn delete_one(&self, collection: &str, filter: &Document) -> Result<(), StorageError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or(StorageError::NotFound)?;
        let position = docs
            .iter()
            .position(|doc| matches(doc, filter))
            .ok_or(StorageError::NotFound)?;

        docs.remove(position);

        Ok(())
    }
}
