//! # volta-sync: Application Services for Volta
//!
//! Everything between the pure rules of `volta-core` and the document store
//! of `volta-store`: the live catalog mirror, accounts and sessions, order
//! placement, the counter, the service desk and the advisor.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Shop                                       │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ CatalogSync  │  │ AuthService  │  │ Checkout /   │  │ Service    │  │
//! │  │              │  │              │  │ PosService   │  │ Desk       │  │
//! │  │ products +   │  │ staff first, │  │              │  │            │  │
//! │  │ sales mirror │  │ then store   │  │ record_sale  │  │ SR-######  │  │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  └─────┬──────┘  │
//! │         │                 │                 │                │         │
//! │         └────────────┬────┴─────────────────┴────────────────┘         │
//! │                      ▼                                                  │
//! │        Remote: every call bounded by a timeout (default 10 s)           │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │        Arc<dyn DocumentStore>  (MemoryStore | SqliteStore)              │
//! │                                                                         │
//! │  Local state: CartState · PosState · LocaleState · SessionManager      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`shop`] - Composition of everything below
//! - [`catalog`] - Live product/sales mirror and catalog writes
//! - [`auth`] - Login resolution, registration, profile edits
//! - [`session`] - Current session and its durable slots
//! - [`checkout`] - Online order placement
//! - [`pos`] - Counter sale operations
//! - [`orders`] - Tracking, status changes, invoices, daily summary
//! - [`service_desk`] - Service bookings and technician dispatch
//! - [`advisor`] - Generative-AI product advisor
//! - [`state`] - Cart, POS working set and language
//! - [`remote`] - Timeout-bounded store access
//! - [`config`] - Configuration loading
//! - [`seed`] - Bootstrap catalog
//! - [`password`] - Argon2 hashing
//! - [`error`] - Error types
//!
//! ## Usage
//! ```rust,ignore
//! use volta_sync::{Shop, ShopConfig};
//!
//! let shop = Shop::open(ShopConfig::load(None)?).await?;
//! shop.start().await?;
//!
//! let hits = shop.pos.search("inverter", None)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod advisor;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod orders;
pub mod password;
pub mod pos;
pub mod remote;
pub mod seed;
pub mod service_desk;
pub mod session;
pub mod shop;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use advisor::Advisor;
pub use auth::{AuthService, Registration};
pub use catalog::{CatalogSync, SyncStatus};
pub use checkout::CheckoutService;
pub use config::ShopConfig;
pub use error::{ShopError, ShopResult};
pub use orders::OrderService;
pub use pos::PosService;
pub use remote::Remote;
pub use service_desk::{Booking, ServiceDesk};
pub use session::{Session, SessionManager};
pub use shop::Shop;
pub use state::{CartState, CartTotals, LocaleState, PosState};
