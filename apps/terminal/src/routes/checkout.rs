//! # Checkout Routes
//!
//! ```text
//! GET  /checkout/fees    delivery fee per zone
//! POST /checkout/quote   derived amounts for the summary panel
//! POST /checkout         place the order; ordered lines leave the cart on success only
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::debug;
use volta_core::checkout::{CheckoutRequest, Quote};
use volta_core::{DeliveryZone, Label, Sale};

use crate::error::{ApiResult, Localize};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(submit))
        .route("/checkout/fees", get(fees))
        .route("/checkout/quote", post(quote))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesResponse {
    pub inside_city_poisha: i64,
    pub outside_city_poisha: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub order: Sale,
    pub message: &'static str,
}

async fn fees(State(shop): State<AppState>) -> Json<FeesResponse> {
    let fees = shop.checkout.fees();
    Json(FeesResponse {
        inside_city_poisha: fees.fee(DeliveryZone::InsideCity).poisha(),
        outside_city_poisha: fees.fee(DeliveryZone::OutsideCity).poisha(),
    })
}

async fn quote(
    State(shop): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<Json<Quote>> {
    shop.checkout
        .quote(&shop.cart, &request)
        .localized(&shop)
        .map(Json)
}

async fn submit(
    State(shop): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderPlaced>)> {
    debug!(zone = ?request.zone, method = ?request.payment_method, "submit_order");
    let sale = shop
        .checkout
        .submit(&shop.cart, &request)
        .await
        .localized(&shop)?;
    Ok((
        StatusCode::CREATED,
        Json(OrderPlaced {
            order: sale,
            message: Label::OrderPlaced.text(shop.locale.get()),
        }),
    ))
}
