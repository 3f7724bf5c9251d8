//! # POS State
//!
//! The counter's current sale, shared by every POS route.

use tokio::sync::{watch, Mutex, MutexGuard};
use volta_core::pos::WorkingSet;

use super::Guarded;

#[derive(Debug)]
pub struct PosState {
    sale: Guarded<WorkingSet>,
    finalizing: Mutex<()>,
}

impl PosState {
    pub fn new() -> Self {
        PosState {
            sale: Guarded::new(WorkingSet::new()),
            finalizing: Mutex::new(()),
        }
    }

    pub fn with_sale<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&WorkingSet) -> R,
    {
        self.sale.read(f)
    }

    pub fn with_sale_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut WorkingSet) -> R,
    {
        self.sale.write(f)
    }

    pub fn snapshot(&self) -> WorkingSet {
        self.sale.read(WorkingSet::clone)
    }

    pub fn watch(&self) -> watch::Receiver<WorkingSet> {
        self.sale.subscribe()
    }

    /// Held for the whole of a finalize, so one working set is never
    /// committed twice.
    pub async fn lock_submission(&self) -> MutexGuard<'_, ()> {
        self.finalizing.lock().await
    }
}

impl Default for PosState {
    fn default() -> Self {
        Self::new()
    }
}
