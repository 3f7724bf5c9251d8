//! # Storefront Cart
//!
//! The customer's cart: a list of product lines with a derived subtotal.
//! It is owned entirely by the client and never persisted; checkout turns it
//! into a [`Sale`](crate::types::Sale).
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Front end action         Cart method            Change                 │
//! │  ────────────────         ───────────            ──────                 │
//! │  "Add to cart" ─────────► add()  ──────────────► push or qty += n       │
//! │                             stock ≤ 0 ─────────► Refused(OutOfStock)    │
//! │                             qty > stock ───────► Refused(StockExceeded) │
//! │  Change quantity ───────► set_quantity() ──────► clamp to [1, stock]    │
//! │                                                  (0 removes)            │
//! │  Remove ────────────────► remove() ────────────► line dropped           │
//! │  Order placed ──────────► deduct() ────────────► submitted units gone   │
//! │  Cart badge / summary ──► subtotal(), count() ─► (read only)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pos::AddOutcome;
use crate::types::{Notice, Product, SaleItem};
use crate::validation::{validate_line_count, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by product id (adding again increases the quantity)
/// - Every quantity is in `1..=min(stock, MAX_ITEM_QUANTITY)` as of the
///   last edit; [`Cart::check_stock`] re-checks against a newer catalog
/// - Prices are frozen when a line is first added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<SaleItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn count(&self) -> i64 {
        self.items.iter().map(SaleItem::quantity).sum()
    }

    /// Σ line totals.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(SaleItem::total_price).sum()
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    ///
    /// An add that would take the line past the product's stock is refused
    /// and leaves the cart untouched.
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<AddOutcome> {
        validate_quantity(quantity)?;
        if !product.in_stock() {
            return Ok(AddOutcome::Refused(Notice::OutOfStock));
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id() == product.id)
        {
            let next = line.quantity().saturating_add(quantity);
            if next > product.stock {
                return Ok(AddOutcome::Refused(Notice::StockExceeded));
            }
            line.set_quantity(next)?;
            return Ok(AddOutcome::Incremented);
        }

        if quantity > product.stock {
            return Ok(AddOutcome::Refused(Notice::StockExceeded));
        }
        validate_line_count(self.items.len())?;
        self.items.push(SaleItem::from_product(product, quantity)?);
        Ok(AddOutcome::Added)
    }

    /// Sets the line for `product` to `quantity`, clamped to the stock.
    ///
    /// Zero removes the line. Returns `StockExceeded` when the request was
    /// clamped, and `OutOfStock` (line dropped) when the product sold out.
    pub fn set_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<Option<Notice>> {
        if quantity == 0 {
            self.remove(&product.id)?;
            return Ok(None);
        }
        validate_quantity(quantity.min(MAX_ITEM_QUANTITY))?;

        let index = self
            .items
            .iter()
            .position(|line| line.product_id() == product.id)
            .ok_or_else(|| CoreError::ProductNotFound(product.id.clone()))?;

        if product.stock <= 0 {
            self.items.remove(index);
            return Ok(Some(Notice::OutOfStock));
        }

        let ceiling = product.stock.min(MAX_ITEM_QUANTITY);
        self.items[index].set_quantity(quantity.min(ceiling))?;
        Ok((quantity > product.stock).then_some(Notice::StockExceeded))
    }

    pub fn remove(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|line| line.product_id() != product_id);
        if self.items.len() == before {
            return Err(CoreError::ProductNotFound(product_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Re-checks every line against the current catalog.
    pub fn check_stock(&self, catalog: &[Product]) -> CoreResult<()> {
        check_line_stock(&self.items, catalog)
    }

    /// Removes the units of a placed order, keeping anything added since.
    pub fn deduct(&mut self, submitted: &[SaleItem]) {
        deduct_lines(&mut self.items, submitted);
    }
}

// =============================================================================
// Line helpers
// =============================================================================

/// Fails on the first line whose quantity exceeds the catalog stock.
/// A product missing from the catalog counts as zero stock.
pub(crate) fn check_line_stock(lines: &[SaleItem], catalog: &[Product]) -> CoreResult<()> {
    for line in lines {
        let available = catalog
            .iter()
            .find(|product| product.id == line.product_id())
            .map(|product| product.stock)
            .unwrap_or(0);
        if line.quantity() > available {
            return Err(CoreError::InsufficientStock {
                product_id: line.product_id().to_string(),
                available,
                requested: line.quantity(),
            });
        }
    }
    Ok(())
}

/// Subtracts each submitted line's quantity from the matching live line,
/// dropping lines that reach zero.
pub(crate) fn deduct_lines(lines: &mut Vec<SaleItem>, submitted: &[SaleItem]) {
    for sold in submitted {
        let Some(index) = lines
            .iter()
            .position(|line| line.product_id() == sold.product_id())
        else {
            continue;
        };
        let left = lines[index].quantity() - sold.quantity();
        if left <= 0 || lines[index].set_quantity(left).is_err() {
            lines.remove(index);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
