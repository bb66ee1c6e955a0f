use std::sync::Arc;

use async_trait::async_trait;
use forgebill_store::{
    DocumentStore, InMemoryDocumentStore, Record, Repository, StoreError, stores,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Customer {
    name: String,
    state_code: String,
}

fn customer(name: &str) -> Customer {
    Customer {
        name: name.to_string(),
        state_code: "27".to_string(),
    }
}

#[tokio::test]
async fn stores_are_created_on_first_write() {
    let store = InMemoryDocumentStore::new();
    assert!(!store.has_store(stores::BILLS));
    assert!(matches!(
        store.get_all(stores::BILLS).await,
        Err(StoreError::MissingStore(_))
    ));

    store
        .set(stores::BILLS, "INV-0001", json!({ "total": "118.00" }))
        .await
        .unwrap();

    assert!(store.has_store(stores::BILLS));
    assert_eq!(
        store.get(stores::BILLS, "INV-0001").await.unwrap(),
        Some(json!({ "total": "118.00" }))
    );
    assert_eq!(store.get(stores::BILLS, "INV-0002").await.unwrap(), None);
}

#[tokio::test]
async fn get_all_returns_records_ordered_by_key() {
    let store = InMemoryDocumentStore::new();
    for key in ["b", "c", "a"] {
        store.set(stores::SETTINGS, key, json!(key)).await.unwrap();
    }

    let all = store.get_all(stores::SETTINGS).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(all[0].value, json!("a"));
}

#[tokio::test]
async fn set_overwrites_and_remove_is_idempotent() {
    let store = InMemoryDocumentStore::new();
    store.set(stores::VENDORS, "v1", json!(1)).await.unwrap();
    store.set(stores::VENDORS, "v1", json!(2)).await.unwrap();
    assert_eq!(store.get(stores::VENDORS, "v1").await.unwrap(), Some(json!(2)));

    store.remove(stores::VENDORS, "v1").await.unwrap();
    store.remove(stores::VENDORS, "v1").await.unwrap();
    store.remove(stores::PAYMENTS, "never-created").await.unwrap();
    assert!(store.get_all(stores::VENDORS).await.unwrap().is_empty());
}

#[tokio::test]
async fn repository_degrades_missing_store_to_empty() {
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
    let repo: Repository<Customer> = Repository::new(store, stores::CUSTOMERS);

    assert!(repo.list().await.is_empty());
    assert_eq!(repo.get("c1").await, None);

    repo.save("c1", &customer("Asha Traders")).await.unwrap();
    repo.save("c2", &customer("Bharat Glass")).await.unwrap();

    assert_eq!(repo.get("c1").await, Some(customer("Asha Traders")));
    assert_eq!(repo.list().await.len(), 2);

    repo.remove("c1").await.unwrap();
    assert_eq!(repo.list().await, vec![customer("Bharat Glass")]);
}

#[tokio::test]
async fn repository_skips_documents_that_do_not_decode() {
    let inner = Arc::new(InMemoryDocumentStore::new());
    inner
        .set(stores::CUSTOMERS, "bad", json!({ "unexpected": true }))
        .await
        .unwrap();
    let repo: Repository<Customer> = Repository::new(inner.clone(), stores::CUSTOMERS);
    repo.save("good", &customer("Chandra & Sons")).await.unwrap();

    assert_eq!(repo.list().await, vec![customer("Chandra & Sons")]);
    assert_eq!(repo.get("bad").await, None);
}

/// Backend that fails every call.
struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn get(&self, _: &str, _: &str) -> Result<Option<JsonValue>, StoreError> {
        Err(StoreError::Backend("disk unavailable".to_string()))
    }

    async fn set(&self, _: &str, _: &str, _: JsonValue) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk unavailable".to_string()))
    }

    async fn remove(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk unavailable".to_string()))
    }

    async fn get_all(&self, _: &str) -> Result<Vec<Record>, StoreError> {
        Err(StoreError::Backend("disk unavailable".to_string()))
    }
}

#[tokio::test]
async fn backend_failures_are_swallowed_on_read_and_returned_on_write() {
    let repo: Repository<Customer> = Repository::new(Arc::new(BrokenStore), stores::CUSTOMERS);

    assert!(repo.list().await.is_empty());
    assert_eq!(repo.get("c1").await, None);
    assert!(matches!(
        repo.save("c1", &customer("Asha Traders")).await,
        Err(StoreError::Backend(_))
    ));
}

#[tokio::test]
async fn raw_records_keep_undecodable_documents_and_return_backend_errors() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let repo: Repository<Customer> = Repository::new(store.clone(), stores::CUSTOMERS);
    assert!(repo.records().await.unwrap().is_empty());

    repo.save("c1", &customer("Asha Traders")).await.unwrap();
    store
        .set(stores::CUSTOMERS, "c2", json!({ "legacy": true }))
        .await
        .unwrap();
    let records = repo.records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].value, json!({ "legacy": true }));

    let broken: Repository<Customer> = Repository::new(Arc::new(BrokenStore), stores::CUSTOMERS);
    assert!(matches!(broken.records().await, Err(StoreError::Backend(_))));
}
