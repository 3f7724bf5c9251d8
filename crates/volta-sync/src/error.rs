//! # Shop Error Types
//!
//! Error type for every service in this crate.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Business rule  │  │    Remote       │  │     Account             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core(..)       │  │  Store(..)      │  │  AlreadyRegistered      │ │
//! │  │  (validation,   │  │  Timeout        │  │  EmailInUse             │ │
//! │  │   stock, totals)│  │  IdsExhausted   │  │  PermissionDenied       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │  Lookup         │  │  Local          │                              │
//! │  │                 │  │                 │                              │
//! │  │  OrderNotFound  │  │  Config*        │                              │
//! │  │  Service…       │  │  Session        │                              │
//! │  │  Technician…    │  │  Password       │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`ShopError::user_message`] renders any error as a fixed, localized label.
//! Login failure is not an error: it is `Ok(None)`.

use std::time::Duration;

use thiserror::Error;
use volta_core::{CoreError, Label, Language, ValidationError};
use volta_store::StoreError;

/// Result type alias for service operations.
pub type ShopResult<T> = Result<T, ShopError>;

#[derive(Debug, Error)]
pub enum ShopError {
    // =========================================================================
    // Business rules
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Remote
    // =========================================================================
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A remote call exceeded the configured bound.
    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    /// Every generated id collided.
    #[error("Could not allocate a free id with prefix {prefix}")]
    IdsExhausted { prefix: String },

    // =========================================================================
    // Accounts
    // =========================================================================
    #[error("Phone {phone} is already registered")]
    AlreadyRegistered { phone: String },

    #[error("Email {email} is already in use")]
    EmailInUse { email: String },

    #[error("Permission denied")]
    PermissionDenied,

    // =========================================================================
    // Lookups that must succeed
    // =========================================================================
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Service request not found: {0}")]
    ServiceRequestNotFound(String),

    #[error("Technician not found: {0}")]
    TechnicianNotFound(String),

    // =========================================================================
    // Local
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Password hashing failed: {0}")]
    Password(String),
}

impl From<ValidationError> for ShopError {
    fn from(err: ValidationError) -> Self {
        ShopError::Core(CoreError::Validation(err))
    }
}

impl From<toml::de::Error> for ShopError {
    fn from(err: toml::de::Error) -> Self {
        ShopError::ConfigLoadFailed(err.to_string())
    }
}

impl ShopError {
    /// The label shown to the user for this error.
    ///
    /// ## Mapping
    /// ```text
    /// phone validation          → InvalidPhone
    /// password too short        → PasswordTooShort
    /// other validation          → CheckFields
    /// stock                     → StockExceeded
    /// store failure             → SaveFailed
    /// timeout                   → RequestTimedOut
    /// ids exhausted             → OrderFailedRetry
    /// ```
    pub fn label(&self) -> Label {
        match self {
            ShopError::Core(err) => match err {
                CoreError::ProductNotFound(_) => Label::ProductNotFound,
                CoreError::InsufficientStock { .. } => Label::StockExceeded,
                CoreError::InvalidStatusTransition { .. } => Label::StatusChangeNotAllowed,
                CoreError::EmptySale => Label::CartEmpty,
                CoreError::DiscountExceedsSubtotal { .. } => Label::DiscountTooLarge,
                CoreError::Overpayment { .. } => Label::Overpayment,
                CoreError::PaidAmountLocked { .. } => Label::CheckFields,
                CoreError::Validation(v) => match (v.field(), v) {
                    ("phone", _) => Label::InvalidPhone,
                    ("password", ValidationError::TooShort { .. }) => Label::PasswordTooShort,
                    _ => Label::CheckFields,
                },
            },
            ShopError::Store(_) => Label::SaveFailed,
            ShopError::Timeout(_) => Label::RequestTimedOut,
            ShopError::IdsExhausted { .. } => Label::OrderFailedRetry,
            ShopError::AlreadyRegistered { .. } => Label::AlreadyRegistered,
            ShopError::EmailInUse { .. } => Label::EmailInUse,
            ShopError::PermissionDenied => Label::PermissionDenied,
            ShopError::OrderNotFound(_) => Label::OrderNotFound,
            ShopError::ServiceRequestNotFound(_) => Label::ServiceNotFound,
            ShopError::TechnicianNotFound(_) => Label::TechnicianNotFound,
            ShopError::InvalidConfig(_)
            | ShopError::ConfigLoadFailed(_)
            | ShopError::Session(_)
            | ShopError::Password(_) => Label::SaveFailed,
        }
    }

    /// Localized message for the user.
    pub fn user_message(&self, lang: Language) -> &'static str {
        self.label().text(lang)
    }

    /// True when the remote side failed and a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ShopError::Timeout(_)
                | ShopError::IdsExhausted { .. }
                | ShopError::Store(StoreError::Unavailable(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_labels() {
        let phone: ShopError = ValidationError::InvalidFormat {
            field: "phone".into(),
            reason: "x".into(),
        }
        .into();
        assert_eq!(phone.label(), Label::InvalidPhone);

        let password: ShopError = ValidationError::TooShort {
            field: "password".into(),
            min: 6,
        }
        .into();
        assert_eq!(password.label(), Label::PasswordTooShort);

        let name: ShopError = ValidationError::Required { field: "name".into() }.into();
        assert_eq!(name.label(), Label::CheckFields);
    }

    #[test]
    fn test_remote_failures() {
        let timeout = ShopError::Timeout(Duration::from_secs(10));
        assert_eq!(timeout.label(), Label::RequestTimedOut);
        assert!(timeout.is_retryable());

        let offline = ShopError::Store(StoreError::Unavailable("down".into()));
        assert_eq!(offline.label(), Label::SaveFailed);
        assert!(offline.is_retryable());

        assert!(!ShopError::PermissionDenied.is_retryable());
    }

    #[test]
    fn test_user_message_is_localized() {
        let err = ShopError::OrderNotFound("GE-1".into());
        assert_ne!(err.user_message(Language::En), err.user_message(Language::Bn));
    }
}
