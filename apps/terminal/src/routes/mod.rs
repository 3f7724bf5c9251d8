pub mod advisor;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod locale;
pub mod orders;
pub mod pos;
pub mod reports;
pub mod service;

use axum::routing::get;
use axum::Router;
use volta_sync::{Session, Shop};

use crate::error::ApiError;
use crate::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .merge(catalog::routes())
        .merge(cart::routes())
        .merge(checkout::routes())
        .merge(pos::routes())
        .merge(auth::routes())
        .merge(orders::routes())
        .merge(service::routes())
        .merge(reports::routes())
        .merge(advisor::routes())
        .merge(locale::routes())
}

// =============================================================================
// Role guards
// =============================================================================

/// The current session, or 401.
pub(crate) fn require_session(shop: &Shop) -> Result<Session, ApiError> {
    shop.auth
        .current()
        .ok_or_else(|| ApiError::unauthorized(shop.locale.get()))
}

/// An admin session, or 401/403.
pub(crate) fn require_admin(shop: &Shop) -> Result<Session, ApiError> {
    let session = require_session(shop)?;
    if !session.is_admin() {
        return Err(ApiError::forbidden(shop.locale.get()));
    }
    Ok(session)
}

/// A pos or admin session, or 401/403.
pub(crate) fn require_seller(shop: &Shop) -> Result<Session, ApiError> {
    let session = require_session(shop)?;
    if !session.can_sell() {
        return Err(ApiError::forbidden(shop.locale.get()));
    }
    Ok(session)
}
