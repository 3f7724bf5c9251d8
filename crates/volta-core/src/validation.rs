//! # Validation Module
//!
//! Input validation for registration, profile edits and the admin product
//! form.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web front end                                                 │
//! │  └── Immediate feedback on empty fields                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service call (Rust)                                           │
//! │  └── THIS MODULE: runs before any remote write                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Document store                                                │
//! │  └── create-if-absent keys (phone, order id)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// People
// =============================================================================

/// Normalizes and validates a Bangladeshi mobile number.
///
/// ## Rules
/// - Spaces and dashes are ignored
/// - An optional `+88` / `88` country prefix is dropped
/// - The rest must be 11 digits: `01`, an operator digit 3-9, 8 more digits
///
/// ## Example
/// ```rust
/// use volta_core::validation::normalize_phone;
///
/// assert_eq!(normalize_phone("+880 1711-000000").unwrap(), "01711000000");
/// assert!(normalize_phone("0123").is_err());
/// ```
pub fn normalize_phone(phone: &str) -> ValidationResult<String> {
    let digits: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let local = digits
        .strip_prefix("+88")
        .or_else(|| digits.strip_prefix("88"))
        .unwrap_or(&digits);

    let bytes = local.as_bytes();
    let valid = bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && local.starts_with("01")
        && (b'3'..=b'9').contains(&bytes[2]);

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "expected an 11 digit mobile number starting with 01".to_string(),
        });
    }

    Ok(local.to_string())
}

/// Validates and lower-cases an email address.
pub fn normalize_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "expected name@domain".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(email)
}

/// Validates a password: at least six characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Validates a required, bounded text field (names, addresses).
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Catalog
// =============================================================================

/// Validates a line quantity.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates that a cart/working set can take one more line.
pub fn validate_line_count(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }
    Ok(())
}

/// Validates a product before the admin form writes it.
///
/// ## Rules
/// - id and English name are required
/// - price ≥ 0, stock ≥ 0
/// - a discount price, when set, is `0 < discount ≤ price`
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_text("id", &product.id, 100)?;
    validate_text("name.en", &product.name.en, 200)?;

    if product.name.bn.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name.bn".to_string(),
            max: 200,
        });
    }

    if product.price_poisha < 0 {
        return Err(ValidationError::OutOfRange {
            field: "pricePoisha".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if product.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if let Some(discount) = product.discount_price_poisha {
        if discount < 0 || discount > product.price_poisha {
            return Err(ValidationError::OutOfRange {
                field: "discountPricePoisha".to_string(),
                min: 0,
                max: product.price_poisha,
            });
        }
    }

    Ok(())
}

/// Trims a search query; an empty query matches everything.
pub fn normalize_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_lowercase())
}

// =============================================================================
// Unit Tests
// =============================================================================
