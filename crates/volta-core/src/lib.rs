//! # volta-core: Pure Business Logic for Volta
//!
//! Everything the storefront and the POS terminal compute, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Volta Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web front end (storefront, admin, POS)       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over localhost                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/terminal (axum routes)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               volta-sync (services + state objects)             │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼──────────────────┐    │
//! │  │ ★ volta-core (THIS CRATE) ★     │  │ volta-store               │    │
//! │  │  types · money · cart ·         │  │  DocumentStore trait,     │    │
//! │  │  checkout · pos · i18n ·        │  │  memory + SQLite adapters │    │
//! │  │  invoice · report · ids         │  └───────────────────────────┘    │
//! │  │  NO I/O • NO NETWORK            │                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, UserProfile, ServiceRequest, ...)
//! - [`money`] - Money type with integer poisha arithmetic
//! - [`cart`] - Storefront cart
//! - [`checkout`] - Delivery fees, payment defaulting, online order assembly
//! - [`pos`] - POS working set, code lookup, counter sale assembly
//! - [`i18n`] - Languages, bilingual text and the label catalog
//! - [`invoice`] - Plain-text invoice rendering
//! - [`report`] - Daily sales summary
//! - [`ids`] - Order / account / service id generation
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use volta_core::checkout::{DeliveryFees, PaymentDraft};
//! use volta_core::{DeliveryZone, Money, PaymentMethod};
//!
//! let fees = DeliveryFees::default();
//! let total = Money::from_taka(200) + fees.fee(DeliveryZone::InsideCity);
//!
//! let mut payment = PaymentDraft::new(total, PaymentMethod::Due);
//! payment.set_paid(Money::from_taka(100)).unwrap();
//! assert_eq!(payment.due(), Money::from_taka(160));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod i18n;
pub mod ids;
pub mod invoice;
pub mod money;
pub mod pos;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use i18n::{Bilingual, Label, Language};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a cart or POS working set.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 on the quantity field.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Minimum password length for registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Near-tier delivery fee when none is configured.
pub const DEFAULT_FEE_INSIDE_CITY_TAKA: i64 = 60;

/// Far-tier delivery fee when none is configured.
pub const DEFAULT_FEE_OUTSIDE_CITY_TAKA: i64 = 120;

/// Asia/Dhaka, UTC+06:00. Used for invoice dates and daily reports.
pub const LOCAL_UTC_OFFSET_SECS: i32 = 6 * 3600;
