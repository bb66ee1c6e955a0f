//! Client-side document storage.
//!
//! The billing core never talks to a storage technology directly. It goes
//! through [`DocumentStore`], a small async key/value contract over named
//! stores holding JSON documents, and through typed [`Repository`] wrappers
//! that turn read failures into empty results.

pub mod document;
pub mod memory;
pub mod repository;

pub use document::{stores, DocumentStore, Record, StoreError};
pub use memory::InMemoryDocumentStore;
pub use repository::Repository;
