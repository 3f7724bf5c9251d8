//! # Error Types
//!
//! Domain-specific error types for volta-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  volta-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  volta-store errors                                                     │
//! │  └── StoreError       - Document store failures                         │
//! │                                                                         │
//! │  volta-sync errors                                                      │
//! │  └── ShopError        - What services return (has a localized message)  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ShopError → ApiError → Front end   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the pure logic in this crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product is not part of the catalog mirror.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Asked for more units than the product has in stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Cashier scans a 200W panel twice, stock = 1
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: "sp-200w", available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// Terminal shows: "Only 1 in stock"
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// A sale or service request cannot move to the requested status.
    #[error("Cannot move from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// The working set or cart has no lines.
    #[error("Sale has no items")]
    EmptySale,

    /// Discount larger than the subtotal would make the total negative.
    #[error("Discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: Money, subtotal: Money },

    /// Paid amount larger than the total.
    #[error("Paid amount {paid} exceeds total {total}")]
    Overpayment { paid: Money, total: Money },

    /// Paid amount edited while a method that fixes it is selected.
    #[error("Paid amount is fixed by payment method {method}")]
    PaidAmountLocked { method: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any remote write happens, so a validation failure never
/// touches stored state.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (phone number, email, id).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., phone number already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "sp-200w".to_string(),
            available: 1,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for sp-200w: available 1, requested 2"
        );

        let err = CoreError::Overpayment {
            paid: Money::from_taka(300),
            total: Money::from_taka(260),
        };
        assert_eq!(err.to_string(), "Paid amount ৳300.00 exceeds total ৳260.00");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.field(), "password");
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
