//! # API Error Type
//!
//! Unified error type for terminal routes.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Terminal                           │
//! │                                                                         │
//! │  Front end                   Rust back end                              │
//! │  ─────────                   ─────────────                              │
//! │                                                                         │
//! │  fetch('/checkout')                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Route handler  ──►  Result<Json<T>, ApiError>                   │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  ShopError ── .localized(&shop) ──► label in the active language │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  HTTP status from ErrorCode  +  { "code", "message" }           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are always one of the fixed labels. Internal detail goes to the
//! log, never to the response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use volta_core::{CoreError, Label, Language};
use volta_sync::{Shop, ShopError, ShopResult};

/// Error body returned from a failed route.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "অর্ডার পাওয়া যায়নি"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Localized message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// 404
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// No session, or login failed (401)
    Unauthorized,

    /// Signed in with the wrong role (403)
    Forbidden,

    /// Phone or email taken (409)
    Conflict,

    /// Stock bound hit (422)
    InsufficientStock,

    /// Business rule refused the operation (422)
    BusinessLogic,

    /// The document store failed or refused the write (503)
    StoreError,

    /// A remote call exceeded its bound (504)
    Timeout,

    /// 500
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::InsufficientStock | ErrorCode::BusinessLogic => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::StoreError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// An error whose message is `label` in `lang`.
    pub fn label(code: ErrorCode, label: Label, lang: Language) -> Self {
        ApiError::new(code, label.text(lang))
    }

    /// Renders a service error in `lang`.
    pub fn from_shop(err: ShopError, lang: Language) -> Self {
        let code = match &err {
            ShopError::Core(core) => match core {
                CoreError::Validation(_) => ErrorCode::ValidationError,
                CoreError::ProductNotFound(_) => ErrorCode::NotFound,
                CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
                CoreError::InvalidStatusTransition { .. }
                | CoreError::EmptySale
                | CoreError::DiscountExceedsSubtotal { .. }
                | CoreError::Overpayment { .. }
                | CoreError::PaidAmountLocked { .. } => ErrorCode::BusinessLogic,
            },
            ShopError::Store(_) | ShopError::IdsExhausted { .. } => ErrorCode::StoreError,
            ShopError::Timeout(_) => ErrorCode::Timeout,
            ShopError::AlreadyRegistered { .. } | ShopError::EmailInUse { .. } => {
                ErrorCode::Conflict
            }
            ShopError::PermissionDenied => ErrorCode::Forbidden,
            ShopError::OrderNotFound(_)
            | ShopError::ServiceRequestNotFound(_)
            | ShopError::TechnicianNotFound(_) => ErrorCode::NotFound,
            ShopError::InvalidConfig(_)
            | ShopError::ConfigLoadFailed(_)
            | ShopError::Session(_)
            | ShopError::Password(_) => ErrorCode::Internal,
        };
        if matches!(code, ErrorCode::StoreError | ErrorCode::Timeout | ErrorCode::Internal) {
            error!(%err, "Request failed");
        }
        ApiError::new(code, err.user_message(lang))
    }

    pub fn unauthorized(lang: Language) -> Self {
        ApiError::label(ErrorCode::Unauthorized, Label::PermissionDenied, lang)
    }

    pub fn forbidden(lang: Language) -> Self {
        ApiError::label(ErrorCode::Forbidden, Label::PermissionDenied, lang)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Localizes service results with the shop's active language.
pub trait Localize<T> {
    fn localized(self, shop: &Shop) -> Result<T, ApiError>;
}

impl<T> Localize<T> for ShopResult<T> {
    fn localized(self, shop: &Shop) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::from_shop(err, shop.locale.get()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
