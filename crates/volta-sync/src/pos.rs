//! # POS Service
//!
//! Counter operations against the live catalog mirror.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan / type code ──► lookup() ──► None ─────────► "product not found"  │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                       add_to_sale() ──► Refused(OutOfStock|Exceeded)    │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  ± buttons ─────────► update_quantity()  (clamped to [1, stock])        │
//! │                            │                                            │
//! │                            ▼                                            │
//! │  Pay ───────────────► finalize()  (one at a time per working set)       │
//! │                         1. re-check stock against the mirror            │
//! │                         2. assemble POS-###### sale, Delivered          │
//! │                         3. record sale + decrement stock (one commit)   │
//! │                         4. deduct the sold lines from the working set   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use volta_core::ids::order_id;
use volta_core::pos::{self, AddOutcome, PosCustomer, PosPayment};
use volta_core::{Category, CoreError, Money, Notice, Product, Sale, SaleChannel};

use crate::catalog::CatalogSync;
use crate::checkout::record_with_fresh_ids;
use crate::error::ShopResult;
use crate::state::PosState;

pub struct PosService {
    catalog: Arc<CatalogSync>,
}

impl PosService {
    pub fn new(catalog: Arc<CatalogSync>) -> Self {
        PosService { catalog }
    }

    /// Barcode, SKU or id lookup. A miss is `None`.
    pub fn lookup(&self, code: &str) -> Option<Product> {
        let products = self.catalog.products();
        let found = pos::find_by_code(&products, code).cloned();
        debug!(code, found = found.is_some(), "Code lookup");
        found
    }

    pub fn search(&self, query: &str, category: Option<Category>) -> ShopResult<Vec<Product>> {
        let products = self.catalog.products();
        Ok(pos::search(&products, query, category)?
            .into_iter()
            .cloned()
            .collect())
    }

    fn product(&self, product_id: &str) -> ShopResult<Product> {
        self.catalog
            .product(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
    }

    pub fn add_to_sale(&self, state: &PosState, product_id: &str) -> ShopResult<AddOutcome> {
        let product = self.product(product_id)?;
        let outcome = state.with_sale_mut(|sale| sale.add_to_sale(&product))?;
        debug!(product_id, ?outcome, "Add to sale");
        Ok(outcome)
    }

    pub fn update_quantity(
        &self,
        state: &PosState,
        product_id: &str,
        delta: i64,
    ) -> ShopResult<Option<Notice>> {
        let product = self.product(product_id)?;
        Ok(state.with_sale_mut(|sale| sale.update_quantity(&product, delta))?)
    }

    pub fn remove_line(&self, state: &PosState, product_id: &str) -> ShopResult<()> {
        Ok(state.with_sale_mut(|sale| sale.remove_line(product_id))?)
    }

    pub fn set_discount(&self, state: &PosState, discount: Money) -> ShopResult<()> {
        Ok(state.with_sale_mut(|sale| sale.set_discount(discount))?)
    }

    /// Completes the counter sale. On any failure the working set is kept.
    pub async fn finalize(
        &self,
        state: &PosState,
        customer: &PosCustomer,
        payment: &PosPayment,
    ) -> ShopResult<Sale> {
        let _finalizing = state.lock_submission().await;
        let working = state.snapshot();
        working.check_stock(&self.catalog.products())?;
        let sale = working.finalize(
            order_id(SaleChannel::Pos, &mut rand::thread_rng()),
            customer,
            payment,
            Utc::now(),
        )?;

        let sale = record_with_fresh_ids(&self.catalog, sale).await?;
        state.with_sale_mut(|sale| sale.deduct(&working));
        info!(order_id = sale.id(), total = %sale.total(), "Counter sale completed");
        Ok(sale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::collections::{PRODUCTS, SALES};
    use crate::remote::Remote;
    use crate::ShopError;
    use std::time::Duration;
    use volta_core::{Bilingual, PaymentMethod, SaleStatus};
    use volta_store::{encode, DocumentStore, MemoryStore};

    fn battery(stock: i64) -> Product {
        Product {
            id: "bat-1".to_string(),
            name: Bilingual::new("Battery 100Ah", "ব্যাটারি ১০০ অ্যাম্পিয়ার-আওয়ার"),
            description: Bilingual::default(),
            price_poisha: 1_200_000,
            discount_price_poisha: Some(1_100_000),
            stock,
            category: Category::Battery,
            is_best_seller: false,
            is_offer: true,
            sku: Some("BAT-100".to_string()),
            barcode: Some("8900000000001".to_string()),
            brand: None,
            image_url: None,
        }
    }

    async fn setup(stock: i64) -> (Arc<MemoryStore>, Arc<CatalogSync>, PosService) {
        let store = Arc::new(MemoryStore::new());
        store
            .set(PRODUCTS, "bat-1", encode(&battery(stock)).unwrap())
            .await
            .unwrap();
        let catalog = CatalogSync::new(Remote::new(store.clone()));
        catalog.start().await.unwrap();
        let service = PosService::new(catalog.clone());
        (store, catalog, service)
    }

    fn cash() -> PosPayment {
        PosPayment {
            method: PaymentMethod::Cash,
            paid_poisha: None,
            tenders: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_lookup_by_any_code() {
        let (_store, catalog, service) = setup(3).await;
        assert!(service.lookup(" 8900000000001 ").is_some());
        assert!(service.lookup("BAT-100").is_some());
        assert!(service.lookup("bat-1").is_some());
        assert!(service.lookup("nope").is_none());
        catalog.stop();
    }

    #[tokio::test]
    async fn test_stock_guard() {
        let (_store, catalog, service) = setup(2).await;
        let state = PosState::new();

        assert_eq!(service.add_to_sale(&state, "bat-1").unwrap(), AddOutcome::Added);
        assert_eq!(service.add_to_sale(&state, "bat-1").unwrap(), AddOutcome::Incremented);
        assert_eq!(
            service.add_to_sale(&state, "bat-1").unwrap(),
            AddOutcome::Refused(Notice::StockExceeded)
        );
        assert_eq!(state.snapshot().lines()[0].quantity(), 2);

        assert_eq!(
            service.update_quantity(&state, "bat-1", 5).unwrap(),
            Some(Notice::StockExceeded)
        );
        assert_eq!(state.snapshot().lines()[0].quantity(), 2);
        catalog.stop();
    }

    #[tokio::test]
    async fn test_finalize_records_and_clears() {
        let (store, catalog, service) = setup(2).await;
        let state = PosState::new();
        service.add_to_sale(&state, "bat-1").unwrap();

        let sale = service
            .finalize(&state, &PosCustomer::default(), &cash())
            .await
            .unwrap();
        assert!(sale.id().starts_with("POS-"));
        assert_eq!(sale.status(), SaleStatus::Delivered);
        assert_eq!(sale.total(), Money::from_poisha(1_100_000));
        assert!(state.snapshot().is_empty());

        let mut rx = catalog.watch_products();
        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|p| p.iter().any(|p| p.id == "bat-1" && p.stock == 1)),
        )
        .await
        .unwrap()
        .unwrap();
        let stored = store.get(PRODUCTS, "bat-1").await.unwrap().unwrap();
        assert_eq!(stored["stock"], 1);
        catalog.stop();
    }

    #[tokio::test]
    async fn test_finalize_failure_keeps_working_set() {
        let (store, catalog, service) = setup(2).await;
        let state = PosState::new();
        service.add_to_sale(&state, "bat-1").unwrap();
        store.set_offline(true);

        let err = service
            .finalize(&state, &PosCustomer::default(), &cash())
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Store(_)));
        assert_eq!(state.snapshot().lines().len(), 1);
        catalog.stop();
    }

    #[tokio::test]
    async fn test_double_finalize_sells_once() {
        let (store, catalog, service) = setup(2).await;
        let state = PosState::new();
        service.add_to_sale(&state, "bat-1").unwrap();

        let customer = PosCustomer::default();
        let (payment_a, payment_b) = (cash(), cash());
        let (first, second) = tokio::join!(
            service.finalize(&state, &customer, &payment_a),
            service.finalize(&state, &customer, &payment_b)
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(ShopError::Core(CoreError::EmptySale))));
        assert_eq!(store.scan(SALES).await.unwrap().len(), 1);
        let stored = store.get(PRODUCTS, "bat-1").await.unwrap().unwrap();
        assert_eq!(stored["stock"], 1);
        catalog.stop();
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (_store, catalog, service) = setup(2).await;
        let err = service.add_to_sale(&PosState::new(), "ghost").unwrap_err();
        assert!(matches!(err, ShopError::Core(CoreError::ProductNotFound(_))));
        catalog.stop();
    }
}
