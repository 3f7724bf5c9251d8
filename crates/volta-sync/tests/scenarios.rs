//! End-to-end flows across volta-core, volta-store and volta-sync.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use volta_core::checkout::CheckoutRequest;
use volta_core::pos::{AddOutcome, PosCustomer, PosPayment};
use volta_core::{
    CustomerInfo, DeliveryZone, Language, Money, Notice, PaymentMethod, Product, Role, SaleStatus,
};
use volta_store::{DbConfig, DocumentStore, MemoryStore, SqliteStore};
use volta_sync::config::{Backend, StaffAccount};
use volta_sync::password::hash_password;
use volta_sync::remote::collections::{PRODUCTS, SALES, USERS};
use volta_sync::seed::bootstrap_products;
use volta_sync::session::MemorySessionSlots;
use volta_sync::{Shop, ShopConfig, ShopError, SyncStatus};

fn config() -> ShopConfig {
    let mut config = ShopConfig::default();
    config.remote.backend = Backend::Memory;
    config.staff = vec![
        StaffAccount {
            username: "admin".to_string(),
            password_hash: hash_password("admin-secret").unwrap(),
            role: Role::Admin,
        },
        StaffAccount {
            username: "counter".to_string(),
            password_hash: hash_password("counter-secret").unwrap(),
            role: Role::Pos,
        },
    ];
    config
}

async fn started(store: Arc<MemoryStore>) -> Shop {
    let shop = Shop::with_store(config(), store, Box::new(MemorySessionSlots::new()));
    shop.start().await.unwrap();
    assert_eq!(shop.catalog.status(), SyncStatus::Ready);
    shop
}

fn checkout(method: PaymentMethod, paid_poisha: Option<i64>) -> CheckoutRequest {
    CheckoutRequest {
        customer: CustomerInfo {
            name: "Farhana Akter".to_string(),
            phone: "01712345678".to_string(),
            email: Some("farhana@example.com".to_string()),
            address: "House 12, Road 5, Banani".to_string(),
            zone: None,
        },
        zone: DeliveryZone::InsideCity,
        payment_method: method,
        paid_poisha,
    }
}

/// A seeded product with a price of exactly ৳100.
fn hundred_taka_product(shop: &Shop) -> Product {
    let mut product = shop.catalog.product("sw-gang-2").unwrap();
    product.price_poisha = Money::from_taka(100).poisha();
    product.discount_price_poisha = None;
    product
}

async fn wait_for_stock(shop: &Shop, product_id: &str, stock: i64) {
    let mut rx = shop.catalog.watch_products();
    tokio::time::timeout(
        Duration::from_secs(2),
        rx.wait_for(|p| p.iter().any(|p| p.id == product_id && p.stock == stock)),
    )
    .await
    .expect("stock did not reach the mirror")
    .expect("mirror closed");
}

#[tokio::test]
async fn online_checkout_full_and_partial_payment() {
    let store = Arc::new(MemoryStore::new());
    let shop = started(store.clone()).await;
    let product = hundred_taka_product(&shop);
    let stock_before = product.stock;

    shop.cart.with_cart_mut(|cart| cart.add(&product, 2)).unwrap();
    let sale = shop
        .checkout
        .submit(&shop.cart, &checkout(PaymentMethod::Cash, None))
        .await
        .unwrap();
    assert_eq!(sale.subtotal(), Money::from_taka(200));
    assert_eq!(sale.total(), Money::from_taka(260));
    assert_eq!(sale.paid(), Money::from_taka(260));
    assert_eq!(sale.due(), Money::zero());
    assert_eq!(sale.status(), SaleStatus::Pending);
    assert!(shop.cart.snapshot().is_empty());
    wait_for_stock(&shop, "sw-gang-2", stock_before - 2).await;

    shop.cart.with_cart_mut(|cart| cart.add(&product, 2)).unwrap();
    let partial = shop
        .checkout
        .submit(&shop.cart, &checkout(PaymentMethod::Due, Some(10_000)))
        .await
        .unwrap();
    assert_eq!(partial.paid(), Money::from_taka(100));
    assert_eq!(partial.due(), Money::from_taka(160));

    let tracked = shop.orders.by_phone("01712345678").await.unwrap();
    assert_eq!(tracked.len(), 2);
    shop.shutdown();
}

#[tokio::test]
async fn seeding_twice_is_a_noop() {
    let store = Arc::new(MemoryStore::new());
    let first = started(store.clone()).await;
    let second = started(store.clone()).await;

    assert_eq!(
        store.scan(PRODUCTS).await.unwrap().len(),
        bootstrap_products().len()
    );
    assert_eq!(first.catalog.products(), second.catalog.products());
    first.shutdown();
    second.shutdown();
}

#[tokio::test]
async fn staff_login_takes_precedence_without_store_reads() {
    let store = Arc::new(MemoryStore::new());
    let shop = started(store.clone()).await;
    store
        .set(
            USERS,
            "admin",
            json!({
                "uid": "admin",
                "accountId": "GE-C-10001",
                "name": "Impostor",
                "role": "customer",
                "createdAt": 1_700_000_000_000i64
            }),
        )
        .await
        .unwrap();
    let reads = store.read_count();

    let session = shop.auth.login("admin", "admin-secret").await.unwrap().unwrap();
    assert_eq!(session.role(), Role::Admin);
    assert_eq!(store.read_count(), reads);

    let session = shop.auth.login("COUNTER", "counter-secret").await.unwrap().unwrap();
    assert_eq!(session.role(), Role::Pos);
    assert_eq!(store.read_count(), reads);

    assert!(shop.auth.login("counter", "wrong").await.unwrap().is_none());
    // Identifiers are matched verbatim.
    assert!(shop.auth.login(" counter", "counter-secret").await.unwrap().is_none());
    shop.auth.logout();
    assert!(shop.auth.current().is_none());
    shop.shutdown();
}

#[tokio::test]
async fn failed_submit_preserves_the_cart() {
    let store = Arc::new(MemoryStore::new());
    let shop = started(store.clone()).await;
    let product = shop.catalog.product("led-bulb-12w").unwrap();
    shop.cart.with_cart_mut(|cart| cart.add(&product, 3)).unwrap();

    store.set_offline(true);
    let err = shop
        .checkout
        .submit(&shop.cart, &checkout(PaymentMethod::Bkash, None))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(shop.cart.snapshot().count(), 3);

    store.set_offline(false);
    let slow = Shop::with_store(
        {
            let mut config = config();
            config.remote.timeout_ms = 50;
            config
        },
        store.clone(),
        Box::new(MemorySessionSlots::new()),
    );
    slow.start().await.unwrap();
    store.set_latency(Duration::from_millis(300));
    slow.cart.with_cart_mut(|cart| cart.add(&product, 1)).unwrap();
    let err = slow
        .checkout
        .submit(&slow.cart, &checkout(PaymentMethod::Cash, None))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::Timeout(_)));
    assert_eq!(
        err.user_message(Language::En),
        volta_core::Label::RequestTimedOut.text(Language::En)
    );
    assert_eq!(slow.cart.snapshot().count(), 1);
    slow.shutdown();
    shop.shutdown();
}

#[tokio::test]
async fn storefront_cart_never_outsells_the_stock() {
    let store = Arc::new(MemoryStore::new());
    let shop = started(store.clone()).await;
    let inverter = shop.catalog.product("inv-hybrid-3kw").unwrap();

    assert_eq!(
        shop.cart.with_cart_mut(|cart| cart.add(&inverter, inverter.stock + 5)).unwrap(),
        AddOutcome::Refused(Notice::StockExceeded)
    );
    assert!(shop.cart.snapshot().is_empty());
    shop.cart.with_cart_mut(|cart| cart.add(&inverter, inverter.stock)).unwrap();

    // The counter sells one while the online cart still holds the full stock.
    shop.pos.add_to_sale(&shop.pos_sale, &inverter.id).unwrap();
    let cash = PosPayment {
        method: PaymentMethod::Cash,
        paid_poisha: None,
        tenders: Vec::new(),
    };
    shop.pos
        .finalize(&shop.pos_sale, &PosCustomer::default(), &cash)
        .await
        .unwrap();
    wait_for_stock(&shop, &inverter.id, inverter.stock - 1).await;

    let err = shop
        .checkout
        .submit(&shop.cart, &checkout(PaymentMethod::Cash, None))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ShopError::Core(volta_core::CoreError::InsufficientStock { .. })
    ));
    assert_eq!(shop.cart.snapshot().count(), inverter.stock);
    assert_eq!(store.scan(SALES).await.unwrap().len(), 1);
    shop.shutdown();
}

#[tokio::test]
async fn concurrent_counter_finalizes_commit_once() {
    let store = Arc::new(MemoryStore::new());
    let shop = started(store.clone()).await;
    let inverter = shop.catalog.product("inv-hybrid-3kw").unwrap();
    shop.pos.add_to_sale(&shop.pos_sale, &inverter.id).unwrap();
    store.set_latency(Duration::from_millis(100));

    let cash = PosPayment {
        method: PaymentMethod::Cash,
        paid_poisha: None,
        tenders: Vec::new(),
    };
    let customer = PosCustomer::default();
    let (first, second) = tokio::join!(
        shop.pos.finalize(&shop.pos_sale, &customer, &cash),
        shop.pos.finalize(&shop.pos_sale, &customer, &cash)
    );
    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);

    store.set_latency(Duration::ZERO);
    wait_for_stock(&shop, &inverter.id, inverter.stock - 1).await;
    assert_eq!(store.scan(SALES).await.unwrap().len(), 1);
    shop.shutdown();
}

#[tokio::test]
async fn counter_sale_is_bounded_by_stock_and_floors_at_zero() {
    let store = Arc::new(MemoryStore::new());
    let shop = started(store.clone()).await;
    let inverter = shop.catalog.product("inv-hybrid-3kw").unwrap();

    for _ in 0..inverter.stock {
        shop.pos.add_to_sale(&shop.pos_sale, &inverter.id).unwrap();
    }
    assert_eq!(
        shop.pos.add_to_sale(&shop.pos_sale, &inverter.id).unwrap(),
        AddOutcome::Refused(Notice::StockExceeded)
    );

    let payment = PosPayment {
        method: PaymentMethod::Card,
        paid_poisha: None,
        tenders: Vec::new(),
    };
    let sale = shop
        .pos
        .finalize(&shop.pos_sale, &PosCustomer::default(), &payment)
        .await
        .unwrap();
    assert_eq!(sale.status(), SaleStatus::Delivered);
    wait_for_stock(&shop, &inverter.id, 0).await;

    // Selling a sold-out product is refused before anything is written.
    assert_eq!(
        shop.pos.add_to_sale(&shop.pos_sale, &inverter.id).unwrap(),
        AddOutcome::Refused(Notice::OutOfStock)
    );
    assert_eq!(store.scan(SALES).await.unwrap().len(), 1);
    shop.shutdown();
}

#[tokio::test]
async fn sqlite_backend_runs_the_same_flow() {
    let store = Arc::new(SqliteStore::open(DbConfig::in_memory()).await.unwrap());
    let shop = Shop::with_store(config(), store.clone(), Box::new(MemorySessionSlots::new()));
    shop.start().await.unwrap();
    assert_eq!(shop.catalog.products().len(), bootstrap_products().len());

    let panel = shop.catalog.product("sp-mono-200w").unwrap();
    shop.pos.add_to_sale(&shop.pos_sale, &panel.id).unwrap();
    let sale = shop
        .pos
        .finalize(
            &shop.pos_sale,
            &PosCustomer::default(),
            &PosPayment {
                method: PaymentMethod::Due,
                paid_poisha: Some(500_000),
                tenders: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(sale.due(), sale.total() - Money::from_poisha(500_000));
    wait_for_stock(&shop, &panel.id, panel.stock - 1).await;

    let tracked = shop.orders.track(sale.id()).await.unwrap();
    assert_eq!(tracked.id(), sale.id());
    assert_eq!(tracked.items(), sale.items());
    assert_eq!(tracked.paid(), sale.paid());
    shop.shutdown();
}
