//! Route-level tests over an in-memory shop.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use volta_core::{Label, Language, Role};
use volta_store::MemoryStore;
use volta_sync::config::{Backend, StaffAccount};
use volta_sync::password::hash_password;
use volta_sync::session::MemorySessionSlots;
use volta_sync::{Shop, ShopConfig};

async fn app() -> (Arc<Shop>, Router) {
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
    let shop = Arc::new(Shop::with_store(
        config,
        Arc::new(MemoryStore::new()),
        Box::new(MemorySessionSlots::new()),
    ));
    shop.start().await.unwrap();
    let router = volta_terminal::router(shop.clone());
    (shop, router)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router, identifier: &str, password: &str) -> StatusCode {
    let body = json!({ "identifier": identifier, "password": password });
    call(app, Method::POST, "/auth/login", Some(body)).await.0
}

fn checkout_body() -> Value {
    json!({
        "customer": {
            "name": "Rafiq Islam",
            "phone": "01712345678",
            "address": "Mirpur 10, Dhaka"
        },
        "zone": "inside_city",
        "paymentMethod": "cash"
    })
}

#[tokio::test]
async fn catalog_is_seeded_and_ready() {
    let (shop, app) = app().await;
    let (status, body) = call(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert!(!body["products"].as_array().unwrap().is_empty());

    let (status, _) = call(&app, Method::GET, "/products/no-such-thing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    shop.shutdown();
}

#[tokio::test]
async fn cart_then_checkout_clears_cart() {
    let (shop, app) = app().await;
    let (status, cart) = call(
        &app,
        Method::POST,
        "/cart/items",
        Some(json!({ "productId": "sw-gang-2", "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totals"]["itemCount"], 2);

    let (status, placed) = call(&app, Method::POST, "/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    let order = &placed["order"];
    assert!(order["id"].as_str().unwrap().starts_with("GE-"));
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["duePoisha"], 0);
    assert_eq!(order["totalPoisha"], order["paidPoisha"]);

    let (_, cart) = call(&app, Method::GET, "/cart", None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    let uri = format!("/orders/{}", order["id"].as_str().unwrap());
    let (status, tracked) = call(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracked["id"], order["id"]);
    shop.shutdown();
}

#[tokio::test]
async fn cart_is_bounded_by_stock() {
    let (shop, app) = app().await;
    let stock = shop.catalog.product("inv-hybrid-3kw").unwrap().stock;

    let body = json!({ "productId": "inv-hybrid-3kw", "quantity": stock + 5 });
    let (status, err) = call(&app, Method::POST, "/cart/items", Some(body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err["code"], "INSUFFICIENT_STOCK");
    assert_eq!(err["message"], Label::StockExceeded.text(Language::En));

    let body = json!({ "productId": "inv-hybrid-3kw" });
    let (status, _) = call(&app, Method::POST, "/cart/items", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({ "quantity": stock + 5 });
    let (status, cart) = call(&app, Method::PUT, "/cart/items/inv-hybrid-3kw", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totals"]["itemCount"], stock);
    assert_eq!(cart["notice"], Label::StockExceeded.text(Language::En));
    shop.shutdown();
}

#[tokio::test]
async fn empty_cart_checkout_is_refused() {
    let (shop, app) = app().await;
    let (status, body) = call(&app, Method::POST, "/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "BUSINESS_LOGIC");
    shop.shutdown();
}

#[tokio::test]
async fn pos_routes_require_a_seller() {
    let (shop, app) = app().await;
    let (status, _) = call(&app, Method::GET, "/pos/sale", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(login(&app, "counter", "counter-secret").await, StatusCode::OK);
    let (status, added) = call(
        &app,
        Method::POST,
        "/pos/sale/items",
        Some(json!({ "productId": "sw-gang-2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["outcome"], "added");

    let (status, sale) = call(
        &app,
        Method::POST,
        "/pos/sale/finalize",
        Some(json!({ "payment": { "method": "cash" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(sale["id"].as_str().unwrap().starts_with("POS-"));
    assert_eq!(sale["status"], "Delivered");

    // The counter account is not an admin.
    let (status, _) = call(&app, Method::GET, "/reports/daily", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    shop.shutdown();
}

#[tokio::test]
async fn failed_login_is_generic_and_localized() {
    let (shop, app) = app().await;
    let (_, locale) = call(&app, Method::POST, "/locale/toggle", None).await;
    assert_eq!(locale["language"], "bn");

    let body = json!({ "identifier": "admin", "password": "wrong" });
    let (status, err) = call(&app, Method::POST, "/auth/login", Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["message"], Label::InvalidCredentials.text(Language::Bn));
    assert!(shop.auth.current().is_none());
    shop.shutdown();
}

#[tokio::test]
async fn admin_delete_needs_confirmation() {
    let (shop, app) = app().await;
    let (status, _) = call(&app, Method::DELETE, "/products/sw-gang-2", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(login(&app, "admin", "admin-secret").await, StatusCode::OK);
    let (status, body) = call(&app, Method::DELETE, "/products/sw-gang-2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], false);
    assert!(shop.catalog.product("sw-gang-2").is_some());

    let (_, body) = call(&app, Method::DELETE, "/products/sw-gang-2?confirm=true", None).await;
    assert_eq!(body["deleted"], true);

    let (status, summary) = call(&app, Method::GET, "/reports/daily", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["orders"], 0);
    shop.shutdown();
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let (shop, app) = app().await;
    let (status, err) = call(&app, Method::GET, "/orders/GE-000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["code"], "NOT_FOUND");
    shop.shutdown();
}

#[tokio::test]
async fn advisor_without_key_falls_back() {
    let (shop, app) = app().await;
    let body = json!({ "prompt": "Which inverter for two fans?", "lang": "en" });
    let (status, answer) = call(&app, Method::POST, "/advisor", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["configured"], false);
    assert_eq!(answer["answer"], Label::AdvisorUnavailable.text(Language::En));
    shop.shutdown();
}
