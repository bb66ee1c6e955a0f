//! The async document-store contract and the store names it serves.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use std::sync::Arc;

/// Names of the stores the billing core uses.
pub mod stores {
    pub const BILLS: &str = "bills";
    pub const CUSTOMERS: &str = "customers";
    pub const VENDORS: &str = "vendors";
    pub const PAYMENTS: &str = "payments";
    pub const CREDIT_NOTES: &str = "credit_notes";
    pub const SETTINGS: &str = "settings";
    /// Events emitted by bills and parties, for history and undo.
    pub const HISTORY: &str = "history";

    pub const ALL: [&str; 7] = [
        BILLS,
        CUSTOMERS,
        VENDORS,
        PAYMENTS,
        CREDIT_NOTES,
        SETTINGS,
        HISTORY,
    ];
}

/// One document as returned by [`DocumentStore::get_all`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub value: JsonValue,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The named store has never been written to.
    #[error("store not found: {0}")]
    MissingStore(String),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Async key/value storage over named stores of JSON documents.
///
/// Stores are created lazily: the first `set` into a store creates it.
/// Reading a store that does not exist yet is `StoreError::MissingStore`;
/// callers that only want data use [`crate::Repository`], which degrades that
/// to an empty result.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, store: &str, key: &str) -> Result<Option<JsonValue>, StoreError>;

    async fn set(&self, store: &str, key: &str, value: JsonValue) -> Result<(), StoreError>;

    /// Removing an absent key (or from an absent store) is not an error.
    async fn remove(&self, store: &str, key: &str) -> Result<(), StoreError>;

    /// Every document in `store`, ordered by key.
    async fn get_all(&self, store: &str) -> Result<Vec<Record>, StoreError>;
}

#[async_trait::async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(&self, store: &str, key: &str) -> Result<Option<JsonValue>, StoreError> {
        (**self).get(store, key).await
    }

    async fn set(&self, store: &str, key: &str, value: JsonValue) -> Result<(), StoreError> {
        (**self).set(store, key, value).await
    }

    async fn remove(&self, store: &str, key: &str) -> Result<(), StoreError> {
        (**self).remove(store, key).await
    }

    async fn get_all(&self, store: &str) -> Result<Vec<Record>, StoreError> {
        (**self).get_all(store).await
    }
}
