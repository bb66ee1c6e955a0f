//! In-memory [`DocumentStore`](crate::DocumentStore) backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use crate::document::{DocumentStore, Record, StoreError};

/// In-memory document store for tests and headless use.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    stores: RwLock<HashMap<String, BTreeMap<String, JsonValue>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `store` has been created by a write.
    pub fn has_store(&self, store: &str) -> bool {
        self.stores
            .read()
            .map(|s| s.contains_key(store))
            .unwrap_or(false)
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("in-memory store lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, store: &str, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        let docs = stores
            .get(store)
            .ok_or_else(|| StoreError::MissingStore(store.to_string()))?;
        Ok(docs.get(key).cloned())
    }

    async fn set(&self, store: &str, key: &str, value: JsonValue) -> Result<(), StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        if !stores.contains_key(store) {
            tracing::debug!(store, "creating store");
        }
        stores
            .entry(store.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, store: &str, key: &str) -> Result<(), StoreError> {
        let mut stores = self.stores.write().map_err(|_| Self::poisoned())?;
        if let Some(docs) = stores.get_mut(store) {
            docs.remove(key);
        }
        Ok(())
    }

    async fn get_all(&self, store: &str) -> Result<Vec<Record>, StoreError> {
        let stores = self.stores.read().map_err(|_| Self::poisoned())?;
        let docs = stores
            .get(store)
            .ok_or_else(|| StoreError::MissingStore(store.to_string()))?;
        Ok(docs
            .iter()
            .map(|(id, value)| Record {
                id: id.clone(),
                value: value.clone(),
            })
            .collect())
    }
}
