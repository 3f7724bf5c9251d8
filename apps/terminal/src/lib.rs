//! # Volta Terminal Library
//!
//! The local command surface the web front end talks to. One [`Shop`] is
//! shared by every route; it owns the cart, the POS working set, the session
//! and the active language.
//!
//! ## Module Organization
//! ```text
//! volta_terminal/
//! ├── lib.rs          ◄─── You are here (router assembly)
//! ├── main.rs         ◄─── Logging, config, serve
//! ├── error.rs        ◄─── ApiError { code, message }
//! └── routes/
//!     ├── mod.rs      ◄─── Route table + role guards
//!     ├── catalog.rs  ◄─── Products (read, admin writes)
//!     ├── cart.rs     ◄─── Storefront cart
//!     ├── checkout.rs ◄─── Quote + place order
//!     ├── pos.rs      ◄─── Counter sale (pos or admin)
//!     ├── auth.rs     ◄─── Login, register, session, profile
//!     ├── orders.rs   ◄─── Tracking, status changes, invoices
//!     ├── service.rs  ◄─── Service desk + technicians
//!     ├── reports.rs  ◄─── Daily summary (admin)
//!     ├── advisor.rs  ◄─── Generative-AI questions
//!     └── locale.rs   ◄─── Language toggle + labels
//! ```

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use volta_sync::Shop;

/// Shared state handed to every route.
pub type AppState = Arc<Shop>;

/// Builds the full router over `shop`.
pub fn router(shop: AppState) -> Router {
    routes::create_router()
        .layer(CorsLayer::permissive())
        .with_state(shop)
}
