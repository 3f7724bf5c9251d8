//! # Remote
//!
//! Timeout-bounded access to the document store.
//!
//! ```text
//! service ──► Remote::commit(..) ──► tokio::time::timeout(10s, store.commit(..))
//!                                         │
//!                     Ok(Ok(v)) ──────────┼──► Ok(v)
//!                     Ok(Err(e)) ─────────┼──► ShopError::Store(e)
//!                     Err(Elapsed) ───────┴──► ShopError::Timeout
//! ```
//! No remote call in the services goes around this type.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::warn;
use volta_store::{Document, DocumentStore, Query, StoreResult, Subscription, Write};

use crate::error::{ShopError, ShopResult};

/// Default bound on a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Collection names.
pub mod collections {
    pub const PRODUCTS: &str = "products";
    pub const SALES: &str = "sales";
    pub const USERS: &str = "users";
    pub const CREDENTIALS: &str = "credentials";
    pub const SERVICE_REQUESTS: &str = "serviceRequests";
    pub const STAFF: &str = "staff";
}

/// A shared store handle with a per-call timeout.
#[derive(Clone)]
pub struct Remote {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl std::fmt::Debug for Remote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Remote")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Remote {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Remote {
            store,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(&self, op: &str, fut: impl Future<Output = StoreResult<T>>) -> ShopResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(op, timeout = ?self.timeout, "Remote call timed out");
                Err(ShopError::Timeout(self.timeout))
            }
        }
    }

    pub async fn get(&self, collection: &str, id: &str) -> ShopResult<Option<Value>> {
        self.bounded("get", self.store.get(collection, id)).await
    }

    pub async fn scan(&self, collection: &str) -> ShopResult<Vec<Document>> {
        self.bounded("scan", self.store.scan(collection)).await
    }

    pub async fn query(&self, query: &Query) -> ShopResult<Vec<Document>> {
        self.bounded("query", self.store.query(query)).await
    }

    pub async fn commit(&self, writes: Vec<Write>) -> ShopResult<()> {
        self.bounded("commit", self.store.commit(writes)).await
    }

    pub fn subscribe(&self, collection: &str) -> Subscription {
        self.store.subscribe(collection)
    }
}
