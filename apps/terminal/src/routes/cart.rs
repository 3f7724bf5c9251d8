//! # Cart Routes
//!
//! Storefront cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │   Form   │     │  Placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   POST /cart/items   (422 past stock)    │              │
//! │                   PUT  /cart/items/{id} (clamped)        ▼              │
//! │                   DELETE /cart/items/{id}        ordered units removed  │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   DELETE /cart ────────────────────► (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volta_core::cart::Cart;
use volta_core::pos::AddOutcome;
use volta_core::{CoreError, Label, Notice, SaleItem};
use volta_sync::{CartTotals, ShopError, ShopResult};

use crate::error::{ApiError, ApiResult, ErrorCode, Localize};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_to_cart))
        .route("/cart/items/{product_id}", put(update_cart_item).delete(remove_from_cart))
}

/// Cart contents with totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<SaleItem>,
    pub totals: CartTotals,
    /// Localized notice when a quantity was clamped to the stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            items: cart.items().to_vec(),
            totals: CartTotals::from(cart),
            notice: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

async fn get_cart(State(shop): State<AppState>) -> Json<CartResponse> {
    Json(shop.cart.with_cart(|cart| CartResponse::from(cart)))
}

fn product_not_found(shop: &AppState) -> ApiError {
    ApiError::label(ErrorCode::NotFound, Label::ProductNotFound, shop.locale.get())
}

/// Adds a product from the mirror. An add past the stock is refused.
async fn add_to_cart(
    State(shop): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> ApiResult<Json<CartResponse>> {
    debug!(product_id = %request.product_id, quantity = request.quantity, "add_to_cart");
    let product = shop
        .catalog
        .product(&request.product_id)
        .ok_or_else(|| product_not_found(&shop))?;

    let result: ShopResult<(AddOutcome, CartResponse)> = shop.cart.with_cart_mut(|cart| {
        let outcome = cart.add(&product, request.quantity)?;
        Ok((outcome, CartResponse::from(&*cart)))
    });
    match result.localized(&shop)? {
        (AddOutcome::Refused(notice), _) => Err(ApiError::label(
            ErrorCode::InsufficientStock,
            notice.label(),
            shop.locale.get(),
        )),
        (AddOutcome::Added | AddOutcome::Incremented, response) => Ok(Json(response)),
    }
}

/// Sets a line's quantity, clamped to the stock; zero removes the line.
async fn update_cart_item(
    State(shop): State<AppState>,
    Path(product_id): Path<String>,
    Json(request): Json<QuantityRequest>,
) -> ApiResult<Json<CartResponse>> {
    debug!(%product_id, quantity = request.quantity, "update_cart_item");
    let product = match shop.catalog.product(&product_id) {
        Some(product) => product,
        // Delisted since it was added; only removal makes sense.
        None if request.quantity == 0 => {
            return edit_cart(&shop, |cart| cart.remove(&product_id).map(|()| None));
        }
        None => return Err(product_not_found(&shop)),
    };
    edit_cart(&shop, |cart| cart.set_quantity(&product, request.quantity))
}

async fn remove_from_cart(
    State(shop): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    debug!(%product_id, "remove_from_cart");
    edit_cart(&shop, |cart| cart.remove(&product_id).map(|()| None))
}

async fn clear_cart(State(shop): State<AppState>) -> Json<CartResponse> {
    debug!("clear_cart");
    Json(shop.cart.with_cart_mut(|cart| {
        cart.clear();
        CartResponse::from(&*cart)
    }))
}

fn edit_cart<F>(shop: &AppState, edit: F) -> ApiResult<Json<CartResponse>>
where
    F: FnOnce(&mut Cart) -> Result<Option<Notice>, CoreError>,
{
    let lang = shop.locale.get();
    shop.cart
        .with_cart_mut(|cart| {
            let notice = edit(cart)?;
            Ok::<_, ShopError>(CartResponse {
                notice: notice.map(|n| n.label().text(lang)),
                ..CartResponse::from(&*cart)
            })
        })
        .localized(shop)
        .map(Json)
}
