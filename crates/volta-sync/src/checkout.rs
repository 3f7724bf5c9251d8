//! # Checkout
//!
//! Turns the storefront cart into an online order.
//!
//! ## User Workflow
//! ```text
//! Cart ──► checkout form ──► quote() ──► submit()  (one at a time per cart)
//!                                          │
//!                     stock re-checked against the mirror
//!                                          │
//!                     build_online_sale(GE-######, Pending)
//!                                          │
//!                     record_sale ── id taken? ── regenerate (≤ 5 tries)
//!                          │
//!                ┌─────────┴──────────┐
//!                ▼                    ▼
//!            committed             failed
//!            ordered units         cart kept, retry message
//!            deducted from cart
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use volta_core::checkout::{build_online_sale, quote_checkout, CheckoutRequest, DeliveryFees, Quote};
use volta_core::ids::{order_id, MAX_ID_ATTEMPTS, ONLINE_ORDER_PREFIX, POS_ORDER_PREFIX};
use volta_core::{Sale, SaleChannel};

use crate::catalog::CatalogSync;
use crate::error::{ShopError, ShopResult};
use crate::state::CartState;

pub struct CheckoutService {
    catalog: Arc<CatalogSync>,
    fees: DeliveryFees,
}

impl CheckoutService {
    pub fn new(catalog: Arc<CatalogSync>, fees: DeliveryFees) -> Self {
        CheckoutService { catalog, fees }
    }

    pub fn fees(&self) -> DeliveryFees {
        self.fees
    }

    /// Derived amounts for the summary panel.
    pub fn quote(&self, cart: &CartState, request: &CheckoutRequest) -> ShopResult<Quote> {
        Ok(cart.with_cart(|cart| quote_checkout(cart, request, &self.fees))?)
    }

    /// Places the order. The ordered units leave the cart only once the sale
    /// is committed; lines added meanwhile stay.
    pub async fn submit(&self, cart: &CartState, request: &CheckoutRequest) -> ShopResult<Sale> {
        let _submitting = cart.lock_submission().await;
        let snapshot = cart.snapshot();
        snapshot.check_stock(&self.catalog.products())?;
        let sale = build_online_sale(
            order_id(SaleChannel::Online, &mut rand::thread_rng()),
            &snapshot,
            request,
            &self.fees,
            Utc::now(),
        )?;
        debug!(lines = snapshot.items().len(), total = %sale.total(), "Submitting order");

        let sale = record_with_fresh_ids(&self.catalog, sale).await?;
        cart.with_cart_mut(|cart| cart.deduct(snapshot.items()));
        info!(order_id = sale.id(), "Order placed");
        Ok(sale)
    }
}

/// Records `sale`, drawing a new id whenever the current one is taken.
pub(crate) async fn record_with_fresh_ids(catalog: &CatalogSync, mut sale: Sale) -> ShopResult<Sale> {
    for attempt in 1..=MAX_ID_ATTEMPTS {
        match catalog.record_sale(&sale).await {
            Ok(()) => return Ok(sale),
            Err(ShopError::Store(err)) if err.is_conflict() => {
                warn!(attempt, order_id = sale.id(), "Order id taken, regenerating");
                sale.reassign_id(order_id(sale.channel(), &mut rand::thread_rng()));
            }
            Err(err) => return Err(err),
        }
    }

    let prefix = match sale.channel() {
        SaleChannel::Online => ONLINE_ORDER_PREFIX,
        SaleChannel::Pos => POS_ORDER_PREFIX,
    };
    Err(ShopError::IdsExhausted {
        prefix: prefix.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::collections::{PRODUCTS, SALES};
    use crate::remote::Remote;
    use std::time::Duration;
    use volta_core::{
        Bilingual, Category, CoreError, CustomerInfo, DeliveryZone, Money, PaymentMethod,
        Product, SaleStatus,
    };
    use volta_store::{encode, DocumentStore, MemoryStore, Write};

    fn switch() -> Product {
        Product {
            id: "sw-1".to_string(),
            name: Bilingual::new("Switch", "সুইচ"),
            description: Bilingual::default(),
            price_poisha: 10_000,
            discount_price_poisha: None,
            stock: 10,
            category: Category::SwitchSocket,
            is_best_seller: false,
            is_offer: false,
            sku: None,
            barcode: None,
            brand: None,
            image_url: None,
        }
    }

    fn request(method: PaymentMethod, paid: Option<i64>) -> CheckoutRequest {
        CheckoutRequest {
            customer: CustomerInfo {
                name: "Karim".to_string(),
                phone: "01811000000".to_string(),
                email: None,
                address: "Dhanmondi 27".to_string(),
                zone: None,
            },
            zone: DeliveryZone::InsideCity,
            payment_method: method,
            paid_poisha: paid,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, Arc<CatalogSync>, CheckoutService, CartState) {
        let store = Arc::new(MemoryStore::new());
        store.set(PRODUCTS, "sw-1", encode(&switch()).unwrap()).await.unwrap();
        let catalog = CatalogSync::new(Remote::new(store.clone()));
        catalog.start().await.unwrap();
        let service = CheckoutService::new(catalog.clone(), DeliveryFees::default());
        let cart = CartState::new();
        cart.with_cart_mut(|c| c.add(&switch(), 2)).unwrap();
        (store, catalog, service, cart)
    }

    #[tokio::test]
    async fn test_happy_path() {
        let (store, catalog, service, cart) = setup().await;

        let quote = service.quote(&cart, &request(PaymentMethod::Cash, None)).unwrap();
        assert_eq!(quote.total_poisha, 26_000);

        let sale = service
            .submit(&cart, &request(PaymentMethod::Cash, None))
            .await
            .unwrap();
        assert!(sale.id().starts_with("GE-"));
        assert_eq!(sale.total(), Money::from_taka(260));
        assert_eq!(sale.paid(), Money::from_taka(260));
        assert_eq!(sale.due(), Money::zero());
        assert_eq!(sale.status(), SaleStatus::Pending);
        assert!(cart.snapshot().is_empty());
        assert!(store.get(SALES, sale.id()).await.unwrap().is_some());
        catalog.stop();
    }

    #[tokio::test]
    async fn test_failure_keeps_cart() {
        let (store, catalog, service, cart) = setup().await;
        store.set_offline(true);

        let err = service
            .submit(&cart, &request(PaymentMethod::Due, Some(10_000)))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(cart.snapshot().count(), 2);
        catalog.stop();
    }

    #[tokio::test]
    async fn test_stock_rechecked_at_submit() {
        let (store, catalog, service, cart) = setup().await;
        let mut scarce = switch();
        scarce.stock = 1;
        store.set(PRODUCTS, "sw-1", encode(&scarce).unwrap()).await.unwrap();
        let mut rx = catalog.watch_products();
        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|p| p.iter().any(|p| p.id == "sw-1" && p.stock == 1)),
        )
        .await
        .unwrap()
        .unwrap();

        let err = service
            .submit(&cart, &request(PaymentMethod::Cash, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ShopError::Core(CoreError::InsufficientStock { .. })));
        assert_eq!(cart.snapshot().count(), 2);
        assert!(store.scan(SALES).await.unwrap().is_empty());
        catalog.stop();
    }

    #[tokio::test]
    async fn test_line_added_during_submit_is_kept() {
        let (store, catalog, service, cart) = setup().await;
        let mut bulb = switch();
        bulb.id = "led-9w".to_string();
        store.set_latency(Duration::from_millis(200));

        let add_meanwhile = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cart.with_cart_mut(|c| c.add(&bulb, 1)).unwrap();
        };
        let req = request(PaymentMethod::Cash, None);
        let (placed, ()) = tokio::join!(
            service.submit(&cart, &req),
            add_meanwhile
        );

        let sale = placed.unwrap();
        assert_eq!(sale.items().len(), 1);
        let left = cart.snapshot();
        assert_eq!(left.items().len(), 1);
        assert_eq!(left.items()[0].product_id(), "led-9w");
        catalog.stop();
    }

    #[tokio::test]
    async fn test_concurrent_submits_place_one_order() {
        let (store, catalog, service, cart) = setup().await;
        let req = request(PaymentMethod::Cash, None);

        let (first, second) = tokio::join!(service.submit(&cart, &req), service.submit(&cart, &req));

        assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
        assert_eq!(store.scan(SALES).await.unwrap().len(), 1);
        assert!(cart.snapshot().is_empty());
        catalog.stop();
    }

    #[tokio::test]
    async fn test_taken_id_is_regenerated() {
        let (store, catalog, _service, cart) = setup().await;
        let sale = build_online_sale(
            "GE-100000",
            &cart.snapshot(),
            &request(PaymentMethod::Cash, None),
            &DeliveryFees::default(),
            Utc::now(),
        )
        .unwrap();
        store
            .commit(vec![Write::create(SALES, "GE-100000", encode(&sale).unwrap())])
            .await
            .unwrap();

        let recorded = record_with_fresh_ids(&catalog, sale).await.unwrap();
        assert_ne!(recorded.id(), "GE-100000");
        assert_eq!(store.scan(SALES).await.unwrap().len(), 2);
        catalog.stop();
    }
}
