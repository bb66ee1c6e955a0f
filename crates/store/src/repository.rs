//! Typed repositories over a [`DocumentStore`](crate::DocumentStore).

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::document::{DocumentStore, Record, StoreError};

/// Typed view over one named store.
///
/// Reads log and degrade: a missing store, a backend failure or a document
/// that no longer deserializes is logged and read as absent. Writes return
/// their errors.
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn save(&self, id: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_value(value)?;
        self.store.set(self.name, id, json).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.store.remove(self.name, id).await
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        let value = match self.store.get(self.name, id).await {
            Ok(Some(v)) => v,
            Ok(None) => return None,
            Err(StoreError::MissingStore(_)) => return None,
            Err(err) => {
                tracing::warn!(store = self.name, id, error = %err, "failed to read document");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::warn!(store = self.name, id, error = %err, "failed to decode document");
                None
            }
        }
    }

    /// All decodable documents, ordered by id.
    pub async fn list(&self) -> Vec<T> {
        let records = match self.store.get_all(self.name).await {
            Ok(records) => records,
            Err(StoreError::MissingStore(_)) => {
                tracing::debug!(store = self.name, "store not created yet");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(store = self.name, error = %err, "failed to list documents");
                return Vec::new();
            }
        };

        records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record.value) {
                Ok(v) => Some(v),
                Err(err) => {
                    tracing::warn!(
                        store = self.name,
                        id = %record.id,
                        error = %err,
                        "skipping undecodable document"
                    );
                    None
                }
            })
            .collect()
    }

    /// Every raw document, decodable or not.
    ///
    /// Unlike the typed reads this does not degrade: backend failures are
    /// returned. A store that was never created reads as empty.
    pub async fn records(&self) -> Result<Vec<Record>, StoreError> {
        match self.store.get_all(self.name).await {
            Err(StoreError::MissingStore(_)) => Ok(Vec::new()),
            other => other,
        }
    }
}
