//! # In-Memory Store
//!
//! A [`DocumentStore`] held entirely in process memory. Used by the test
//! suites and by `backend = "memory"` terminals.
//!
//! Two switches simulate a remote backend:
//! - [`MemoryStore::set_offline`] makes every call fail with
//!   [`StoreError::Unavailable`]
//! - [`MemoryStore::set_latency`] delays every call

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{
    check_expected, decrement_saturating, merge_shallow, ChangeEvent, Document, Query, Write,
};
use crate::error::{StoreError, StoreResult};
use crate::hub::{ChangeHub, Subscription};
use crate::store::DocumentStore;

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Process-local document store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    hub: ChangeHub,
    offline: AtomicBool,
    latency_ms: AtomicU64,
    reads: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        debug!(offline, "Memory store connectivity changed");
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of read calls (get, scan, query) served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> StoreResult<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("backend offline".to_string()));
        }
        Ok(())
    }

    async fn gate_read(&self) -> StoreResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.gate().await
    }
}

/// Looks up a document in the staged overlay first, then in the committed data.
fn current(
    collections: &Collections,
    staged: &HashMap<(String, String), Option<Value>>,
    collection: &str,
    id: &str,
) -> Option<Value> {
    match staged.get(&(collection.to_string(), id.to_string())) {
        Some(value) => value.clone(),
        None => collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.gate_read().await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.gate_read().await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.gate_read().await?;
        let collections = self.collections.read().await;
        let matching = collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| query.matches(data))
                    .map(|(id, data)| Document::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(query.finish(matching))
    }

    async fn commit(&self, writes: Vec<Write>) -> StoreResult<()> {
        self.gate().await?;
        let mut collections = self.collections.write().await;

        // Stage every write first so a failure leaves nothing applied.
        let mut staged: HashMap<(String, String), Option<Value>> = HashMap::new();
        let mut events: Vec<(String, ChangeEvent)> = Vec::with_capacity(writes.len());

        for write in writes {
            let key = (write.collection().to_string(), write.id().to_string());
            let existing = current(&collections, &staged, &key.0, &key.1);

            let next = match write {
                Write::Create {
                    collection, id, data, ..
                } => {
                    if existing.is_some() {
                        return Err(StoreError::already_exists(collection, id));
                    }
                    Some(data)
                }
                Write::Set { data, .. } => Some(data),
                Write::Merge { data, .. } => {
                    let mut doc = existing.unwrap_or(Value::Null);
                    merge_shallow(&mut doc, data);
                    Some(doc)
                }
                Write::Delete { .. } => {
                    if existing.is_none() {
                        continue;
                    }
                    None
                }
                Write::Decrement { field, by, .. } => match existing {
                    Some(mut doc) => {
                        decrement_saturating(&mut doc, &field, by);
                        Some(doc)
                    }
                    None => continue,
                },
                Write::Expect { field, value, .. } => {
                    check_expected(existing.as_ref(), &key.0, &key.1, &field, &value)?;
                    continue;
                }
            };

            let event = match &next {
                Some(data) => ChangeEvent::Upserted {
                    id: key.1.clone(),
                    data: data.clone(),
                },
                None => ChangeEvent::Removed { id: key.1.clone() },
            };
            events.push((key.0.clone(), event));
            staged.insert(key, next);
        }

        for ((collection, id), value) in staged {
            let docs = collections.entry(collection).or_default();
            match value {
                Some(data) => {
                    docs.insert(id, data);
                }
                None => {
                    docs.remove(&id);
                }
            }
        }
        drop(collections);

        for (collection, event) in events {
            self.hub.publish(&collection, event);
        }
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> Subscription {
        self.hub.subscribe(collection)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Direction;
    use crate::hub::StreamItem;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_is_create_if_absent() {
        let store = MemoryStore::new();
        store
            .create("products", "sp-200w", json!({"stock": 5}))
            .await
            .unwrap();

        let err = store
            .create("products", "sp-200w", json!({"stock": 9}))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let doc = store.get("products", "sp-200w").await.unwrap().unwrap();
        assert_eq!(doc["stock"], 5);
    }

    #[tokio::test]
    async fn test_expect_guards_the_commit() {
        let store = MemoryStore::new();
        store
            .create("sales", "GE-1", json!({"status": "Pending"}))
            .await
            .unwrap();

        let guarded = |from: &str, to: &str| {
            vec![
                Write::expect("sales", "GE-1", "status", from),
                Write::merge("sales", "GE-1", json!({"status": to})),
            ]
        };
        store.commit(guarded("Pending", "Cancelled")).await.unwrap();

        let err = store.commit(guarded("Pending", "Delivered")).await.unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed { .. }));
        let doc = store.get("sales", "GE-1").await.unwrap().unwrap();
        assert_eq!(doc["status"], "Cancelled");

        let missing = vec![Write::expect("sales", "GE-2", "status", "Pending")];
        assert!(store.commit(missing).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_commit_applies_nothing() {
        let store = MemoryStore::new();
        store.create("sales", "GE-1", json!({})).await.unwrap();
        store
            .create("products", "p1", json!({"stock": 3}))
            .await
            .unwrap();

        let result = store
            .commit(vec![
                Write::decrement("products", "p1", "stock", 1),
                Write::create("sales", "GE-1", json!({"again": true})),
            ])
            .await;
        assert!(result.is_err());

        let doc = store.get("products", "p1").await.unwrap().unwrap();
        assert_eq!(doc["stock"], 3);
    }

    #[tokio::test]
    async fn test_merge_and_decrement() {
        let store = MemoryStore::new();
        store
            .merge("users", "01711000000", json!({"name": "Karim"}))
            .await
            .unwrap();
        store
            .merge("users", "01711000000", json!({"address": "Mirpur"}))
            .await
            .unwrap();
        let user = store.get("users", "01711000000").await.unwrap().unwrap();
        assert_eq!(user, json!({"name": "Karim", "address": "Mirpur"}));

        store
            .create("products", "p1", json!({"stock": 2}))
            .await
            .unwrap();
        store
            .commit(vec![
                Write::decrement("products", "p1", "stock", 5),
                Write::decrement("products", "missing", "stock", 1),
            ])
            .await
            .unwrap();
        let product = store.get("products", "p1").await.unwrap().unwrap();
        assert_eq!(product["stock"], 0);
        assert!(store.get("products", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_filters_and_orders() {
        let store = MemoryStore::new();
        for (id, phone, date) in [("a", "1", 10), ("b", "2", 20), ("c", "1", 30)] {
            store
                .set("sales", id, json!({"customer": {"phone": phone}, "date": date}))
                .await
                .unwrap();
        }

        let query = Query::collection("sales")
            .where_eq("customer.phone", "1")
            .order_by("date", Direction::Descending);
        let ids: Vec<String> = store
            .query(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_committed_changes() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("products");

        store.set("products", "p1", json!({"stock": 1})).await.unwrap();
        store.delete("products", "p1").await.unwrap();
        // Deleting a missing document emits nothing.
        store.delete("products", "p1").await.unwrap();
        store.set("products", "p2", json!({})).await.unwrap();

        match sub.next().await {
            Some(StreamItem::Change(ChangeEvent::Upserted { id, .. })) => assert_eq!(id, "p1"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            sub.next().await,
            Some(StreamItem::Change(ChangeEvent::Removed { id: "p1".to_string() }))
        );
        match sub.next().await {
            Some(StreamItem::Change(event)) => assert_eq!(event.id(), "p2"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_offline_store_is_unavailable() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.get("products", "p1").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.set("products", "p1", json!({})).await.is_err());

        store.set_offline(false);
        assert!(store.get("products", "p1").await.unwrap().is_none());
        assert_eq!(store.read_count(), 2);
    }
}
