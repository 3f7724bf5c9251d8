//! # Money Module
//!
//! Provides the `Money` type for handling taka amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In a browser front end:                                                │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  Due amounts are shown to customers and printed on invoices, so a      │
//! │  stray fraction of a poisha shows up as a real discrepancy.            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Poisha (1 taka = 100 poisha)                     │
//! │    ৳260.00 is stored as 26000                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use volta_core::money::Money;
//!
//! let price = Money::from_taka(100);          // ৳100.00
//! let line = price * 2;                       // ৳200.00
//! let total = line + Money::from_taka(60);    // ৳260.00 with delivery
//! assert_eq!(total.poisha(), 26_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in poisha, the smallest taka unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: intermediate results such as `total - paid` may go
///   negative before they are clamped
/// - **Single field tuple struct**: serializes as a bare number in documents
///
/// ## Where Money Flows
/// ```text
/// Product.price_poisha ──► SaleItem.unit_price ──► SaleItem.total_price
///                                                        │
/// Sale.subtotal ◄────────────────────────────────────────┘
///     │
///     ├── − discount + delivery fee ──► Sale.total
///     │
///     └── total − paid ──► Sale.due (clamped at zero)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from poisha.
    ///
    /// ## Example
    /// ```rust
    /// use volta_core::money::Money;
    ///
    /// let price = Money::from_poisha(1_050); // ৳10.50
    /// assert_eq!(price.poisha(), 1_050);
    /// ```
    #[inline]
    pub const fn from_poisha(poisha: i64) -> Self {
        Money(poisha)
    }

    /// Creates a Money value from whole taka.
    ///
    /// Prices in the catalog are almost always whole taka, so this is the
    /// constructor used by the seed data and configuration.
    #[inline]
    pub const fn from_taka(taka: i64) -> Self {
        Money(taka * 100)
    }

    /// Returns the value in poisha.
    #[inline]
    pub const fn poisha(&self) -> i64 {
        self.0
    }

    /// Returns the whole-taka portion.
    #[inline]
    pub const fn taka(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the poisha portion (always 0-99).
    #[inline]
    pub const fn poisha_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Total ৳260, customer pays ৳300 in cash
    ///      │
    ///      ▼
    /// (total - paid).floor_zero() ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Due: ৳0 (never −৳40)
    /// ```
    #[inline]
    pub const fn floor_zero(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use volta_core::money::Money;
    ///
    /// let unit_price = Money::from_taka(450);
    /// assert_eq!(unit_price.multiply_quantity(3), Money::from_taka(1_350));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `৳1350.00` (no digit grouping).
///
/// The invoice renderer uses this directly; the web front end does its own
/// locale-aware formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}৳{}.{:02}", sign, self.taka().abs(), self.poisha_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_taka() {
        let money = Money::from_taka(260);
        assert_eq!(money.poisha(), 26_000);
        assert_eq!(money.taka(), 260);
        assert_eq!(money.poisha_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_poisha(1_099)), "৳10.99");
        assert_eq!(format!("{}", Money::from_taka(60)), "৳60.00");
        assert_eq!(format!("{}", Money::from_poisha(-550)), "-৳5.50");
        assert_eq!(format!("{}", Money::zero()), "৳0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_taka(100);
        let b = Money::from_taka(40);

        assert_eq!(a + b, Money::from_taka(140));
        assert_eq!(a - b, Money::from_taka(60));
        assert_eq!(a * 3, Money::from_taka(300));
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!((Money::from_taka(260) - Money::from_taka(300)).floor_zero(), Money::zero());
        assert_eq!((Money::from_taka(260) - Money::from_taka(100)).floor_zero(), Money::from_taka(160));
    }

    #[test]
    fn test_sum() {
        let lines = [Money::from_taka(200), Money::from_taka(60), Money::from_poisha(50)];
        let total: Money = lines.iter().sum();
        assert_eq!(total.poisha(), 26_050);
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::from_taka(5)).unwrap();
        assert_eq!(json, "500");
    }
}
