//! # Shop
//!
//! Wires the configured backend, the services and the state objects into
//! one value the terminal owns.
//!
//! ```text
//! ShopConfig ──► Shop::open()
//!                  │
//!                  ├── backend: MemoryStore | SqliteStore
//!                  ├── Remote (timeout)
//!                  ├── CatalogSync ── sync() on start()
//!                  ├── AuthService ── SessionManager::restore(slots)
//!                  ├── Checkout / Pos / Orders / ServiceDesk / Advisor
//!                  └── CartState · PosState · LocaleState
//! ```

use std::sync::Arc;

use tracing::info;
use volta_store::{DbConfig, DocumentStore, MemoryStore, SqliteStore};

use crate::advisor::Advisor;
use crate::auth::AuthService;
use crate::catalog::CatalogSync;
use crate::checkout::CheckoutService;
use crate::config::{Backend, ShopConfig};
use crate::error::{ShopError, ShopResult};
use crate::orders::OrderService;
use crate::pos::PosService;
use crate::remote::Remote;
use crate::service_desk::ServiceDesk;
use crate::session::{FileSessionSlots, MemorySessionSlots, SessionManager, SessionSlots};
use crate::state::{CartState, LocaleState, PosState};

pub struct Shop {
    pub config: ShopConfig,
    pub remote: Remote,
    pub catalog: Arc<CatalogSync>,
    pub auth: AuthService,
    pub checkout: CheckoutService,
    pub pos: PosService,
    pub orders: OrderService,
    pub service_desk: ServiceDesk,
    pub advisor: Advisor,
    pub cart: CartState,
    pub pos_sale: PosState,
    pub locale: LocaleState,
}

impl Shop {
    /// Opens the configured backend and session slots.
    pub async fn open(config: ShopConfig) -> ShopResult<Self> {
        let store: Arc<dyn DocumentStore> = match config.remote.backend {
            Backend::Memory => {
                info!("Using in-memory document store");
                Arc::new(MemoryStore::new())
            }
            Backend::Sqlite => {
                let path = config.database_path().ok_or_else(|| {
                    ShopError::InvalidConfig("no database path available".to_string())
                })?;
                info!(?path, "Opening SQLite document store");
                Arc::new(SqliteStore::open(DbConfig::new(path)).await?)
            }
        };
        let slots: Box<dyn SessionSlots> = match &config.session.dir {
            Some(dir) => Box::new(FileSessionSlots::new(dir)),
            None => Box::new(MemorySessionSlots::new()),
        };
        Ok(Self::with_store(config, store, slots))
    }

    /// Builds every service over an existing store.
    pub fn with_store(
        config: ShopConfig,
        store: Arc<dyn DocumentStore>,
        slots: Box<dyn SessionSlots>,
    ) -> Self {
        let remote = Remote::new(store).with_timeout(config.remote_timeout());
        let catalog = CatalogSync::new(remote.clone());
        let sessions = Arc::new(SessionManager::restore(slots));

        Shop {
            remote: remote.clone(),
            auth: AuthService::new(remote.clone(), config.staff.clone(), sessions),
            checkout: CheckoutService::new(catalog.clone(), config.delivery_fees()),
            pos: PosService::new(catalog.clone()),
            orders: OrderService::new(remote.clone(), catalog.clone()),
            service_desk: ServiceDesk::new(remote),
            advisor: Advisor::new(config.advisor.clone()),
            cart: CartState::new(),
            pos_sale: PosState::new(),
            locale: LocaleState::new(config.locale.default_language),
            catalog,
            config,
        }
    }

    /// Seeds an empty catalog and starts the live mirror.
    pub async fn start(&self) -> ShopResult<()> {
        self.catalog.sync().await
    }

    pub fn shutdown(&self) {
        self.catalog.stop();
        info!("Shop stopped");
    }
}
