//! # Change Hub
//!
//! Fans committed writes out to collection subscribers.
//!
//! ```text
//! commit() ──► ChangeHub::publish("products", Upserted{…})
//!                     │
//!        broadcast::Sender per collection (created on first use)
//!          ┌──────────┼──────────┐
//!          ▼          ▼          ▼
//!    Subscription Subscription Subscription
//! ```
//! A slow subscriber that falls more than the channel capacity behind gets
//! [`StreamItem::Lagged`] and must re-read a full snapshot.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::trace;

use crate::document::ChangeEvent;

/// Events buffered per collection before a subscriber lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Per-collection broadcast channels.
#[derive(Debug)]
pub struct ChangeHub {
    capacity: usize,
    senders: Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        ChangeHub::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ChangeHub {
    pub fn with_capacity(capacity: usize) -> Self {
        ChangeHub {
            capacity: capacity.max(1),
            senders: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, collection: &str) -> broadcast::Sender<ChangeEvent> {
        let mut senders = self
            .senders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        senders
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    pub fn subscribe(&self, collection: &str) -> Subscription {
        Subscription {
            collection: collection.to_string(),
            rx: self.sender(collection).subscribe(),
        }
    }

    /// Sends `event` to current subscribers of `collection`.
    pub fn publish(&self, collection: &str, event: ChangeEvent) {
        trace!(collection, id = event.id(), "Publishing change");
        // No receivers is fine: nobody is watching this collection yet.
        let _ = self.sender(collection).send(event);
    }
}

/// What a subscription yields.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    Change(ChangeEvent),
    /// `n` events were dropped; the subscriber's view is stale.
    Lagged(u64),
}

/// A live stream of one collection's changes.
#[derive(Debug)]
pub struct Subscription {
    collection: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Next item, or `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<StreamItem> {
        match self.rx.recv().await {
            Ok(event) => Some(StreamItem::Change(event)),
            Err(broadcast::error::RecvError::Lagged(n)) => Some(StreamItem::Lagged(n)),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
