//! # DocumentStore Trait
//!
//! The one seam between Volta's services and persistence.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get(collection, id)        → Option<Value>                            │
//! │  scan(collection)           → every document, ordered by id            │
//! │  query(Query)               → filtered / ordered / limited documents   │
//! │  commit(Vec<Write>)         → all writes applied atomically, or none   │
//! │  subscribe(collection)      → Subscription (changes after commit)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adapters publish one [`ChangeEvent`](crate::ChangeEvent) per applied
//! write, in write order, only after the whole commit succeeded.

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{Document, Query, Write};
use crate::error::StoreResult;
use crate::hub::Subscription;

/// Async document store. Implemented by [`MemoryStore`](crate::MemoryStore)
/// and [`SqliteStore`](crate::SqliteStore).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Reads a whole collection, ordered by id.
    async fn scan(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Runs an equality query.
    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>>;

    /// Applies every write or none of them.
    async fn commit(&self, writes: Vec<Write>) -> StoreResult<()>;

    /// Subscribes to changes committed after this call.
    fn subscribe(&self, collection: &str) -> Subscription;

    /// Create-if-absent.
    async fn create(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        self.commit(vec![Write::create(collection, id, data)]).await
    }

    /// Full overwrite.
    async fn set(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        self.commit(vec![Write::set(collection, id, data)]).await
    }

    /// Shallow field merge; creates the document when missing.
    async fn merge(&self, collection: &str, id: &str, data: Value) -> StoreResult<()> {
        self.commit(vec![Write::merge(collection, id, data)]).await
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.commit(vec![Write::delete(collection, id)]).await
    }
}
