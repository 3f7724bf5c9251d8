//! # Order Routes
//!
//! ```text
//! GET   /orders/{id}             track one order (404 on miss)
//! GET   /orders?phone=…          orders of one customer, newest first
//! GET   /orders                  admin: every mirrored order
//! PATCH /orders/{id}/status      admin: { status }
//! GET   /orders/{id}/invoice     plain-text invoice, ?lang=en|bn
//! ```

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;
use volta_core::{Language, Sale, SaleStatus};

use super::require_admin;
use crate::error::{ApiResult, Localize};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(track_order))
        .route("/orders/{id}/status", patch(advance_status))
        .route("/orders/{id}/invoice", get(invoice))
}

#[derive(Debug, Deserialize)]
pub struct OrdersParams {
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: SaleStatus,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceParams {
    pub lang: Option<Language>,
}

async fn track_order(
    State(shop): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    let sale = shop.orders.track(&id).await.localized(&shop)?;
    Ok(Json(sale))
}

async fn list_orders(
    State(shop): State<AppState>,
    Query(params): Query<OrdersParams>,
) -> ApiResult<Json<Vec<Sale>>> {
    let sales = match params.phone.as_deref() {
        Some(phone) => {
            debug!(phone, "orders_by_phone");
            shop.orders.by_phone(phone).await.localized(&shop)?
        }
        None => {
            require_admin(&shop)?;
            shop.orders.all().as_ref().clone()
        }
    };
    Ok(Json(sales))
}

async fn advance_status(
    State(shop): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<Sale>> {
    require_admin(&shop)?;
    let sale = shop
        .orders
        .advance_status(&id, request.status)
        .await
        .localized(&shop)?;
    Ok(Json(sale))
}

async fn invoice(
    State(shop): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<InvoiceParams>,
) -> ApiResult<impl IntoResponse> {
    let lang = params.lang.unwrap_or_else(|| shop.locale.get());
    let text = shop
        .orders
        .invoice(&id, &shop.config.store, lang)
        .await
        .localized(&shop)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}
