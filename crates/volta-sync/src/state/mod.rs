//! # State Module
//!
//! Process-local state objects the terminal owns.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐              │
//! │  │  CartState   │  │   PosState   │  │   LocaleState    │              │
//! │  │              │  │              │  │                  │              │
//! │  │  Mutex<Cart> │  │  Mutex<      │  │  Mutex<Language> │              │
//! │  │              │  │  WorkingSet> │  │                  │              │
//! │  └──────┬───────┘  └──────┬───────┘  └────────┬─────────┘              │
//! │         │ publish on change                    │                        │
//! │         ▼                 ▼                    ▼                        │
//! │     watch::Receiver   watch::Receiver    watch::Receiver                │
//! │                                                                         │
//! │  Every mutation goes through one Mutex-guarded action; readers get     │
//! │  the last published snapshot without taking the lock.                  │
//! │  Checkout and finalize also hold an async submission lock, so two      │
//! │  submits of the same state run one after the other.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod locale;
mod pos;

use std::sync::Mutex;

use tokio::sync::watch;

pub use cart::{CartState, CartTotals};
pub use locale::LocaleState;
pub use pos::PosState;

/// A single-writer value whose snapshots are published on change.
#[derive(Debug)]
pub(crate) struct Guarded<T> {
    value: Mutex<T>,
    published: watch::Sender<T>,
}

impl<T: Clone + PartialEq> Guarded<T> {
    pub(crate) fn new(value: T) -> Self {
        Guarded {
            published: watch::channel(value.clone()).0,
            value: Mutex::new(value),
        }
    }

    pub(crate) fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let value = self.value.lock().unwrap_or_else(|p| p.into_inner());
        f(&value)
    }

    /// Runs `f` under the lock and publishes the result if it changed.
    pub(crate) fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut value = self.value.lock().unwrap_or_else(|p| p.into_inner());
        let result = f(&mut value);
        self.published.send_if_modified(|snapshot| {
            if *snapshot != *value {
                *snapshot = value.clone();
                true
            } else {
                false
            }
        });
        result
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<T> {
        self.published.subscribe()
    }
}
