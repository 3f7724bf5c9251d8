//! # Catalog Routes
//!
//! Reads come from the live mirror; writes go to the store and reach the
//! mirror through the change stream.
//!
//! ```text
//! GET    /products              mirror snapshot + sync status
//! GET    /products/{id}         one product (404 on miss)
//! POST   /products              admin: create (id must be free)
//! PUT    /products/{id}         admin: overwrite
//! DELETE /products/{id}?confirm=true
//!                               admin: delete; without confirm nothing is sent
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volta_core::{Label, Product};
use volta_sync::SyncStatus;

use super::require_admin;
use crate::error::{ApiError, ApiResult, ErrorCode, Localize};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(add_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub status: SyncStatus,
    pub products: Arc<Vec<Product>>,
}

async fn list_products(State(shop): State<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        status: shop.catalog.status(),
        products: shop.catalog.products(),
    })
}

async fn get_product(
    State(shop): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    shop.catalog.product(&id).map(Json).ok_or_else(|| {
        ApiError::label(ErrorCode::NotFound, Label::ProductNotFound, shop.locale.get())
    })
}

async fn add_product(
    State(shop): State<AppState>,
    Json(product): Json<Product>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    require_admin(&shop)?;
    shop.catalog.add_product(&product).await.localized(&shop)?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(shop): State<AppState>,
    Path(id): Path<String>,
    Json(mut product): Json<Product>,
) -> ApiResult<Json<Product>> {
    require_admin(&shop)?;
    shop.catalog
        .update_product(&id, &product)
        .await
        .localized(&shop)?;
    product.id = id;
    Ok(Json(product))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub message: &'static str,
}

async fn delete_product(
    State(shop): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> ApiResult<Json<DeleteResponse>> {
    require_admin(&shop)?;
    debug!(product_id = %id, confirm = params.confirm, "delete_product");
    let deleted = shop
        .catalog
        .delete_product(&id, |_| params.confirm)
        .await
        .localized(&shop)?;
    let message = if deleted {
        ""
    } else {
        Label::DeleteCancelled.text(shop.locale.get())
    };
    Ok(Json(DeleteResponse { deleted, message }))
}
