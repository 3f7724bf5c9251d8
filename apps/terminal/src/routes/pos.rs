//! # POS Routes
//!
//! Counter operations. Every route requires a pos or admin session.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Scanner / keyboard                                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  GET /pos/lookup/{code} ──► 404 "product not found"                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  POST  /pos/sale/items            { productId }   ──► outcome + notice  │
//! │  PATCH /pos/sale/items/{id}       { delta }       ──► clamped, notice   │
//! │  DELETE /pos/sale/items/{id}                                            │
//! │  PUT   /pos/sale/discount         { discountPoisha }                    │
//! │  POST  /pos/sale/quote            { method, paidPoisha, tenders }       │
//! │  POST  /pos/sale/finalize         { customer, payment } ──► POS-######  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volta_core::checkout::Quote;
use volta_core::pos::{AddOutcome, PosCustomer, PosPayment, WorkingSet};
use volta_core::{Category, Label, Money, Notice, Product, Sale, SaleItem};
use volta_sync::ShopError;

use super::require_seller;
use crate::error::{ApiError, ApiResult, ErrorCode, Localize};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pos/lookup/{code}", get(lookup))
        .route("/pos/search", get(search))
        .route("/pos/sale", get(get_sale).delete(clear_sale))
        .route("/pos/sale/items", post(add_to_sale))
        .route("/pos/sale/items/{product_id}", patch(update_quantity).delete(remove_line))
        .route("/pos/sale/discount", put(set_discount))
        .route("/pos/sale/quote", post(quote))
        .route("/pos/sale/finalize", post(finalize))
}

/// The working set as the counter screen shows it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosSaleResponse {
    pub lines: Vec<SaleItem>,
    pub subtotal_poisha: i64,
    pub discount_poisha: i64,
    pub total_poisha: i64,
    /// Localized notice when a stock bound was hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

impl PosSaleResponse {
    fn new(sale: &WorkingSet, notice: Option<&'static str>) -> Self {
        PosSaleResponse {
            lines: sale.lines().to_vec(),
            subtotal_poisha: sale.subtotal().poisha(),
            discount_poisha: sale.discount().poisha(),
            total_poisha: sale.total().poisha(),
            notice,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub outcome: AddOutcome,
    pub sale: PosSaleResponse,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeltaRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRequest {
    pub discount_poisha: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    #[serde(default)]
    pub customer: PosCustomer,
    pub payment: PosPayment,
}

// =============================================================================
// Lookup
// =============================================================================

async fn lookup(State(shop): State<AppState>, Path(code): Path<String>) -> ApiResult<Json<Product>> {
    require_seller(&shop)?;
    shop.pos.lookup(&code).map(Json).ok_or_else(|| {
        ApiError::label(ErrorCode::NotFound, Label::ProductNotFound, shop.locale.get())
    })
}

async fn search(
    State(shop): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Product>>> {
    require_seller(&shop)?;
    shop.pos
        .search(&params.q, params.category)
        .localized(&shop)
        .map(Json)
}

// =============================================================================
// Working set
// =============================================================================

fn snapshot(shop: &AppState, notice: Option<Notice>) -> PosSaleResponse {
    let lang = shop.locale.get();
    shop.pos_sale
        .with_sale(|sale| PosSaleResponse::new(sale, notice.map(|n| n.label().text(lang))))
}

async fn get_sale(State(shop): State<AppState>) -> ApiResult<Json<PosSaleResponse>> {
    require_seller(&shop)?;
    Ok(Json(snapshot(&shop, None)))
}

async fn clear_sale(State(shop): State<AppState>) -> ApiResult<Json<PosSaleResponse>> {
    require_seller(&shop)?;
    debug!("clear_sale");
    shop.pos_sale.with_sale_mut(|sale| sale.clear());
    Ok(Json(snapshot(&shop, None)))
}

async fn add_to_sale(
    State(shop): State<AppState>,
    Json(request): Json<AddRequest>,
) -> ApiResult<Json<AddResponse>> {
    require_seller(&shop)?;
    let outcome = shop
        .pos
        .add_to_sale(&shop.pos_sale, &request.product_id)
        .localized(&shop)?;
    let notice = match outcome {
        AddOutcome::Refused(notice) => Some(notice),
        AddOutcome::Added | AddOutcome::Incremented => None,
    };
    Ok(Json(AddResponse {
        outcome,
        sale: snapshot(&shop, notice),
    }))
}

async fn update_quantity(
    State(shop): State<AppState>,
    Path(product_id): Path<String>,
    Json(request): Json<DeltaRequest>,
) -> ApiResult<Json<PosSaleResponse>> {
    require_seller(&shop)?;
    let notice = shop
        .pos
        .update_quantity(&shop.pos_sale, &product_id, request.delta)
        .localized(&shop)?;
    Ok(Json(snapshot(&shop, notice)))
}

async fn remove_line(
    State(shop): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<PosSaleResponse>> {
    require_seller(&shop)?;
    shop.pos
        .remove_line(&shop.pos_sale, &product_id)
        .localized(&shop)?;
    Ok(Json(snapshot(&shop, None)))
}

async fn set_discount(
    State(shop): State<AppState>,
    Json(request): Json<DiscountRequest>,
) -> ApiResult<Json<PosSaleResponse>> {
    require_seller(&shop)?;
    shop.pos
        .set_discount(&shop.pos_sale, Money::from_poisha(request.discount_poisha))
        .localized(&shop)?;
    Ok(Json(snapshot(&shop, None)))
}

async fn quote(
    State(shop): State<AppState>,
    Json(payment): Json<PosPayment>,
) -> ApiResult<Json<Quote>> {
    require_seller(&shop)?;
    shop.pos_sale
        .with_sale(|sale| sale.quote(&payment))
        .map_err(ShopError::from)
        .localized(&shop)
        .map(Json)
}

async fn finalize(
    State(shop): State<AppState>,
    Json(request): Json<FinalizeRequest>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let session = require_seller(&shop)?;
    debug!(role = %session.role(), method = ?request.payment.method, "finalize_sale");
    let sale = shop
        .pos
        .finalize(&shop.pos_sale, &request.customer, &request.payment)
        .await
        .localized(&shop)?;
    Ok((StatusCode::CREATED, Json(sale)))
}
