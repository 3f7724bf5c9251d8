//! # Cart State
//!
//! The storefront cart of this terminal.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Front end action        Route                  Cart change             │
//! │  ────────────────        ─────                  ───────────             │
//! │  Add to cart ──────────► POST /cart/items ────► merge or push line      │
//! │  Change quantity ──────► PUT /cart/items/:id ─► set quantity            │
//! │  Remove ───────────────► DELETE /cart/items/:id► drop line              │
//! │  Order placed ─────────► POST /checkout ──────► deduct (success only)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, MutexGuard};
use volta_core::cart::Cart;

use super::Guarded;

/// Cart totals for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: i64,
    pub subtotal_poisha: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.items().len(),
            item_count: cart.count(),
            subtotal_poisha: cart.subtotal().poisha(),
        }
    }
}

#[derive(Debug)]
pub struct CartState {
    cart: Guarded<Cart>,
    submitting: Mutex<()>,
}

impl CartState {
    pub fn new() -> Self {
        CartState {
            cart: Guarded::new(Cart::new()),
            submitting: Mutex::new(()),
        }
    }

    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|cart| CartTotals::from(cart));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        self.cart.read(f)
    }

    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add(&product, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        self.cart.write(f)
    }

    pub fn snapshot(&self) -> Cart {
        self.cart.read(Cart::clone)
    }

    pub fn watch(&self) -> watch::Receiver<Cart> {
        self.cart.subscribe()
    }

    /// Held for the whole of a checkout; a second checkout waits for the
    /// first to finish and then sees what it left behind.
    pub async fn lock_submission(&self) -> MutexGuard<'_, ()> {
        self.submitting.lock().await
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}
