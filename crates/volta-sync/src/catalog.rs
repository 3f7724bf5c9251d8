//! # Catalog Synchronization
//!
//! Keeps a live local mirror of the `products` and `sales` collections and
//! owns every write to them.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Uninitialized ──start()──► Loading ──products snapshot──► Ready        │
//! │                                                                         │
//! │  start():                                                               │
//! │    1. subscribe("products"), subscribe("sales")                         │
//! │    2. scan products          → mirror, status Ready                     │
//! │    3. query sales by date ↓  → mirror (failure does not block Ready)    │
//! │    4. spawn one follower per collection:                                │
//! │                                                                         │
//! │         Change(Upserted{id}) ──► replace/insert by id                   │
//! │         Change(Removed{id})  ──► drop by id                             │
//! │         Lagged(n)            ──► re-read full snapshot                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Writes
//! Product writes go straight to the store. The mirror only changes when the
//! store's change event comes back, so the UI never shows a write that did
//! not land.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use volta_core::validation::validate_product;
use volta_core::{Product, Sale};
use volta_store::{encode, ChangeEvent, Direction, Query, StreamItem, Subscription, Write};

use crate::error::ShopResult;
use crate::remote::collections::{PRODUCTS, SALES};
use crate::remote::Remote;
use crate::seed::bootstrap_products;

/// Mirror readiness. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy)]
enum Feed {
    Products,
    Sales,
}

/// The catalog mirror and write path.
pub struct CatalogSync {
    remote: Remote,
    status: watch::Sender<SyncStatus>,
    products: watch::Sender<Arc<Vec<Product>>>,
    sales: watch::Sender<Arc<Vec<Sale>>>,
    started: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for CatalogSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogSync")
            .field("status", &*self.status.borrow())
            .field("products", &self.products.borrow().len())
            .field("sales", &self.sales.borrow().len())
            .finish()
    }
}

impl CatalogSync {
    pub fn new(remote: Remote) -> Arc<Self> {
        Arc::new(CatalogSync {
            remote,
            status: watch::channel(SyncStatus::Uninitialized).0,
            products: watch::channel(Arc::new(Vec::new())).0,
            sales: watch::channel(Arc::new(Vec::new())).0,
            started: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        })
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Products, ordered by id.
    pub fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.products.borrow())
    }

    pub fn watch_products(&self) -> watch::Receiver<Arc<Vec<Product>>> {
        self.products.subscribe()
    }

    /// Sales, newest first.
    pub fn sales(&self) -> Arc<Vec<Sale>> {
        Arc::clone(&self.sales.borrow())
    }

    pub fn watch_sales(&self) -> watch::Receiver<Arc<Vec<Sale>>> {
        self.sales.subscribe()
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        let products = self.products.borrow();
        products
            .binary_search_by(|p| p.id.as_str().cmp(id))
            .ok()
            .map(|index| products[index].clone())
    }

    // =========================================================================
    // Startup
    // =========================================================================

    /// Seeds an empty catalog, then starts the mirror.
    pub async fn sync(self: &Arc<Self>) -> ShopResult<()> {
        self.seed_if_empty().await?;
        self.start().await
    }

    /// Writes the bootstrap catalog when the product collection is empty.
    ///
    /// Every write is create-if-absent, so a concurrent seeder makes this
    /// call a no-op instead of clobbering. Returns the number of products
    /// written.
    pub async fn seed_if_empty(&self) -> ShopResult<usize> {
        let existing = self.remote.scan(PRODUCTS).await?;
        if !existing.is_empty() {
            debug!(count = existing.len(), "Catalog already seeded");
            return Ok(0);
        }

        let products = bootstrap_products();
        let mut writes = Vec::with_capacity(products.len());
        for product in &products {
            writes.push(Write::create(PRODUCTS, product.id.as_str(), encode(product)?));
        }

        match self.remote.commit(writes).await {
            Ok(()) => {
                info!(count = products.len(), "Seeded bootstrap catalog");
                Ok(products.len())
            }
            Err(crate::error::ShopError::Store(err)) if err.is_conflict() => {
                info!("Catalog seeded concurrently, skipping");
                Ok(0)
            }
            Err(err) => {
                error!(%err, "Failed to seed catalog");
                Err(err)
            }
        }
    }

    /// Subscribes, loads the initial snapshots and starts following changes.
    /// Calling it again while running is a no-op.
    pub async fn start(self: &Arc<Self>) -> ShopResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // Subscribe before reading so nothing between snapshot and stream is lost.
        let products_sub = self.remote.subscribe(PRODUCTS);
        let sales_sub = self.remote.subscribe(SALES);
        self.advance(SyncStatus::Loading);

        if let Err(err) = self.reload(Feed::Products).await {
            self.started.store(false, Ordering::SeqCst);
            error!(%err, "Initial products snapshot failed");
            return Err(err);
        }
        if let Err(err) = self.reload(Feed::Sales).await {
            warn!(%err, "Initial sales snapshot failed");
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        tasks.push(tokio::spawn(Arc::clone(self).follow(products_sub, Feed::Products)));
        tasks.push(tokio::spawn(Arc::clone(self).follow(sales_sub, Feed::Sales)));
        info!("Catalog mirror running");
        Ok(())
    }

    /// Stops following change streams.
    pub fn stop(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|p| p.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
        self.started.store(false, Ordering::SeqCst);
    }

    fn advance(&self, next: SyncStatus) {
        self.status.send_if_modified(|current| {
            if next > *current {
                info!(from = ?*current, to = ?next, "Catalog status changed");
                *current = next;
                true
            } else {
                false
            }
        });
    }

    async fn follow(self: Arc<Self>, mut sub: Subscription, feed: Feed) {
        while let Some(item) = sub.next().await {
            match item {
                StreamItem::Change(event) => self.apply(feed, event),
                StreamItem::Lagged(missed) => {
                    warn!(collection = sub.collection(), missed, "Change stream lagged, reloading");
                    if let Err(err) = self.reload(feed).await {
                        error!(collection = sub.collection(), %err, "Snapshot reload failed");
                    }
                }
            }
        }
        debug!(collection = sub.collection(), "Change stream closed");
    }

    async fn reload(&self, feed: Feed) -> ShopResult<()> {
        match feed {
            Feed::Products => {
                let docs = self.remote.scan(PRODUCTS).await?;
                let mut products: Vec<Product> = docs
                    .into_iter()
                    .filter_map(|doc| decode_product(&doc.id, doc.data))
                    .collect();
                products.sort_by(|a, b| a.id.cmp(&b.id));
                debug!(count = products.len(), "Products snapshot loaded");
                self.products.send_replace(Arc::new(products));
                self.advance(SyncStatus::Ready);
            }
            Feed::Sales => {
                let query = Query::collection(SALES).order_by("date", Direction::Descending);
                let docs = self.remote.query(&query).await?;
                let sales: Vec<Sale> = docs
                    .into_iter()
                    .filter_map(|doc| decode_sale(&doc.id, doc.data))
                    .collect();
                debug!(count = sales.len(), "Sales snapshot loaded");
                self.sales.send_replace(Arc::new(sales));
            }
        }
        Ok(())
    }

    fn apply(&self, feed: Feed, event: ChangeEvent) {
        match (feed, event) {
            (Feed::Products, ChangeEvent::Upserted { id, data }) => {
                if let Some(product) = decode_product(&id, data) {
                    self.products.send_modify(|list| {
                        let list = Arc::make_mut(list);
                        match list.binary_search_by(|p| p.id.cmp(&product.id)) {
                            Ok(index) => list[index] = product,
                            Err(index) => list.insert(index, product),
                        }
                    });
                }
            }
            (Feed::Products, ChangeEvent::Removed { id }) => {
                self.products
                    .send_modify(|list| Arc::make_mut(list).retain(|p| p.id != id));
            }
            (Feed::Sales, ChangeEvent::Upserted { id, data }) => {
                if let Some(sale) = decode_sale(&id, data) {
                    self.sales.send_modify(|list| {
                        let list = Arc::make_mut(list);
                        list.retain(|s| s.id() != sale.id());
                        let index = list
                            .iter()
                            .position(|s| s.date() < sale.date())
                            .unwrap_or(list.len());
                        list.insert(index, sale);
                    });
                }
            }
            (Feed::Sales, ChangeEvent::Removed { id }) => {
                self.sales
                    .send_modify(|list| Arc::make_mut(list).retain(|s| s.id() != id));
            }
        }
    }

    // =========================================================================
    // Product writes (admin)
    // =========================================================================

    /// Creates a product. Fails if the id is already taken.
    pub async fn add_product(&self, product: &Product) -> ShopResult<()> {
        validate_product(product)?;
        self.remote
            .commit(vec![Write::create(PRODUCTS, product.id.as_str(), encode(product)?)])
            .await
            .inspect(|_| info!(product_id = %product.id, "Product added"))
            .inspect_err(|err| error!(product_id = %product.id, %err, "Failed to add product"))
    }

    /// Overwrites the product stored under `id`.
    pub async fn update_product(&self, id: &str, product: &Product) -> ShopResult<()> {
        let mut product = product.clone();
        product.id = id.to_string();
        validate_product(&product)?;
        self.remote
            .commit(vec![Write::set(PRODUCTS, id, encode(&product)?)])
            .await
            .inspect(|_| info!(product_id = %id, "Product updated"))
            .inspect_err(|err| error!(product_id = %id, %err, "Failed to update product"))
    }

    /// Deletes a product after `confirm` agrees. Returns `false` when the
    /// operator cancelled; nothing is sent to the store in that case.
    pub async fn delete_product<F>(&self, id: &str, confirm: F) -> ShopResult<bool>
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(id) {
            debug!(product_id = %id, "Delete cancelled");
            return Ok(false);
        }
        self.remote
            .commit(vec![Write::delete(PRODUCTS, id)])
            .await
            .inspect(|_| info!(product_id = %id, "Product deleted"))
            .inspect_err(|err| error!(product_id = %id, %err, "Failed to delete product"))?;
        Ok(true)
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Writes the sale and its stock decrements in one atomic commit.
    ///
    /// ```text
    /// commit [
    ///   Create  sales/{id}                      (AlreadyExists on id collision)
    ///   Decrement products/{item} stock by qty  (for each item known to the mirror)
    /// ]
    /// ```
    /// Stock is floored at zero by the store. Items whose product is not in
    /// the mirror are recorded without touching stock.
    pub async fn record_sale(&self, sale: &Sale) -> ShopResult<()> {
        let known = self.products();
        let mut writes = Vec::with_capacity(sale.items().len() + 1);
        writes.push(Write::create(SALES, sale.id(), encode(sale)?));

        for item in sale.items() {
            let in_mirror = known
                .binary_search_by(|p| p.id.as_str().cmp(item.product_id()))
                .is_ok();
            if in_mirror {
                writes.push(Write::decrement(
                    PRODUCTS,
                    item.product_id(),
                    "stock",
                    item.quantity(),
                ));
            } else {
                debug!(product_id = item.product_id(), "Unknown product, stock untouched");
            }
        }

        self.remote
            .commit(writes)
            .await
            .inspect(|_| info!(sale_id = sale.id(), total = %sale.total(), "Sale recorded"))
            .inspect_err(|err| error!(sale_id = sale.id(), %err, "Failed to record sale"))
    }
}

fn decode_product(id: &str, data: serde_json::Value) -> Option<Product> {
    match serde_json::from_value::<Product>(data) {
        Ok(mut product) => {
            product.id = id.to_string();
            Some(product)
        }
        Err(err) => {
            warn!(product_id = id, %err, "Skipping malformed product");
            None
        }
    }
}

fn decode_sale(id: &str, data: serde_json::Value) -> Option<Sale> {
    match serde_json::from_value::<Sale>(data) {
        Ok(sale) => Some(sale),
        Err(err) => {
            warn!(sale_id = id, %err, "Skipping malformed sale");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use volta_core::pos::{PosCustomer, PosPayment, WorkingSet};
    use volta_core::{Bilingual, Category, PaymentMethod};
    use volta_store::{DocumentStore, MemoryStore};

    fn catalog() -> (Arc<MemoryStore>, Arc<CatalogSync>) {
        let store = Arc::new(MemoryStore::new());
        let sync = CatalogSync::new(Remote::new(store.clone()));
        (store, sync)
    }

    fn bulb(stock: i64) -> Product {
        Product {
            id: "bulb-9w".to_string(),
            name: Bilingual::new("LED Bulb 9W", "এলইডি বাল্ব ৯ ওয়াট"),
            description: Bilingual::default(),
            price_poisha: 15_000,
            discount_price_poisha: None,
            stock,
            category: Category::Lighting,
            is_best_seller: false,
            is_offer: false,
            sku: Some("LED-9".to_string()),
            barcode: None,
            brand: None,
            image_url: None,
        }
    }

    async fn wait_for_products<F>(sync: &CatalogSync, pred: F)
    where
        F: FnMut(&Arc<Vec<Product>>) -> bool,
    {
        let mut rx = sync.watch_products();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(pred))
            .await
            .expect("mirror did not update in time")
            .expect("mirror closed");
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let (store, sync) = catalog();
        let written = sync.seed_if_empty().await.unwrap();
        assert_eq!(written, bootstrap_products().len());

        assert_eq!(sync.seed_if_empty().await.unwrap(), 0);
        assert_eq!(store.scan(PRODUCTS).await.unwrap().len(), written);
    }

    #[tokio::test]
    async fn test_seed_does_not_touch_a_populated_catalog() {
        let (store, sync) = catalog();
        store
            .set(PRODUCTS, "bulb-9w", encode(&bulb(3)).unwrap())
            .await
            .unwrap();
        assert_eq!(sync.seed_if_empty().await.unwrap(), 0);
        assert_eq!(store.scan(PRODUCTS).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_moves_forward_to_ready() {
        let (_store, sync) = catalog();
        assert_eq!(sync.status(), SyncStatus::Uninitialized);
        sync.sync().await.unwrap();
        assert_eq!(sync.status(), SyncStatus::Ready);
        assert!(!sync.products().is_empty());
        sync.stop();
    }

    #[tokio::test]
    async fn test_product_round_trip_through_mirror() {
        let (_store, sync) = catalog();
        sync.start().await.unwrap();

        sync.add_product(&bulb(10)).await.unwrap();
        wait_for_products(&sync, |p| p.iter().any(|p| p.id == "bulb-9w")).await;
        assert_eq!(sync.product("bulb-9w").unwrap(), bulb(10));

        let mut updated = bulb(10);
        updated.price_poisha = 12_000;
        sync.update_product("bulb-9w", &updated).await.unwrap();
        wait_for_products(&sync, |p| p.iter().any(|p| p.price_poisha == 12_000)).await;

        assert!(!sync.delete_product("bulb-9w", |_| false).await.unwrap());
        assert!(sync.product("bulb-9w").is_some());

        assert!(sync.delete_product("bulb-9w", |_| true).await.unwrap());
        wait_for_products(&sync, |p| p.is_empty()).await;
        sync.stop();
    }

    #[tokio::test]
    async fn test_invalid_product_is_not_written() {
        let (store, sync) = catalog();
        let mut bad = bulb(1);
        bad.discount_price_poisha = Some(bad.price_poisha + 1);
        assert!(sync.add_product(&bad).await.is_err());
        assert!(store.get(PRODUCTS, "bulb-9w").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_failure_is_returned() {
        let (store, sync) = catalog();
        store.set_offline(true);
        assert!(sync.add_product(&bulb(1)).await.is_err());
        assert!(sync.delete_product("bulb-9w", |_| true).await.is_err());
    }

    #[tokio::test]
    async fn test_record_sale_decrements_stock_with_floor() {
        let (store, sync) = catalog();
        store
            .set(PRODUCTS, "bulb-9w", encode(&bulb(2)).unwrap())
            .await
            .unwrap();
        sync.start().await.unwrap();

        let mut set = WorkingSet::new();
        set.add_to_sale(&bulb(2)).unwrap();
        set.add_to_sale(&bulb(2)).unwrap();
        let sale = set
            .finalize(
                "POS-000001",
                &PosCustomer::default(),
                &PosPayment {
                    method: PaymentMethod::Cash,
                    paid_poisha: None,
                    tenders: Vec::new(),
                },
                chrono::Utc::now(),
            )
            .unwrap();

        // Another terminal sold one unit meanwhile.
        store
            .commit(vec![Write::decrement(PRODUCTS, "bulb-9w", "stock", 1)])
            .await
            .unwrap();

        sync.record_sale(&sale).await.unwrap();
        wait_for_products(&sync, |p| p.iter().any(|p| p.id == "bulb-9w" && p.stock == 0)).await;

        let stored = store.get(SALES, "POS-000001").await.unwrap().unwrap();
        assert_eq!(stored["totalPoisha"], 30_000);

        let mut rx = sync.watch_sales();
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| s.len() == 1))
            .await
            .unwrap()
            .unwrap();

        // Same id again: rejected, stock untouched.
        assert!(sync.record_sale(&sale).await.is_err());
        sync.stop();
    }
}
