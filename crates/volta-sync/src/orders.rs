//! # Orders
//!
//! Order tracking, admin status changes, invoices and the daily report.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::{debug, info, warn};
use volta_core::invoice::{local_offset, render_invoice, StoreInfo};
use volta_core::report::{summarize_day, SalesSummary};
use volta_core::validation::normalize_phone;
use volta_core::{Language, Sale, SaleStatus};
use volta_store::{Direction, Query, StoreError, Write};

use crate::catalog::CatalogSync;
use crate::error::{ShopError, ShopResult};
use crate::remote::collections::SALES;
use crate::remote::Remote;

/// Re-reads allowed when the status moves between read and write.
const STATUS_ATTEMPTS: u32 = 3;

pub struct OrderService {
    remote: Remote,
    catalog: Arc<CatalogSync>,
}

impl OrderService {
    pub fn new(remote: Remote, catalog: Arc<CatalogSync>) -> Self {
        OrderService { remote, catalog }
    }

    /// Reads one order straight from the store.
    pub async fn track(&self, order_id: &str) -> ShopResult<Sale> {
        let order_id = order_id.trim();
        debug!(order_id, "Tracking order");
        let data = self
            .remote
            .get(SALES, order_id)
            .await?
            .ok_or_else(|| ShopError::OrderNotFound(order_id.to_string()))?;
        Ok(serde_json::from_value(data).map_err(StoreError::from)?)
    }

    /// Orders placed with `phone`, newest first.
    pub async fn by_phone(&self, phone: &str) -> ShopResult<Vec<Sale>> {
        let phone = normalize_phone(phone)?;
        let query = Query::collection(SALES)
            .where_eq("customer.phone", phone)
            .order_by("date", Direction::Descending);
        self.remote
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode::<Sale>().map_err(ShopError::from))
            .collect()
    }

    /// Every order known to the mirror, newest first.
    pub fn all(&self) -> Arc<Vec<Sale>> {
        self.catalog.sales()
    }

    /// Moves an order along its lifecycle. Only the status field is written,
    /// and only while the stored status is still the one that was checked.
    /// A concurrent change is re-read and the transition checked again.
    pub async fn advance_status(&self, order_id: &str, next: SaleStatus) -> ShopResult<Sale> {
        let mut attempt = 1;
        loop {
            let mut sale = self.track(order_id).await?;
            let from = sale.status();
            sale.advance_status(next)?;
            let writes = vec![
                Write::expect(SALES, sale.id(), "status", json!(from)),
                Write::merge(SALES, sale.id(), json!({ "status": next })),
            ];
            match self.remote.commit(writes).await {
                Ok(()) => {
                    info!(order_id = sale.id(), %from, to = %next, "Order status changed");
                    return Ok(sale);
                }
                Err(ShopError::Store(StoreError::PreconditionFailed { .. }))
                    if attempt < STATUS_ATTEMPTS =>
                {
                    warn!(order_id = sale.id(), %from, attempt, "Order status changed concurrently");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Plain-text invoice, from the mirror when possible.
    pub async fn invoice(&self, order_id: &str, store: &StoreInfo, lang: Language) -> ShopResult<String> {
        let cached = self
            .catalog
            .sales()
            .iter()
            .find(|sale| sale.id() == order_id.trim())
            .cloned();
        let sale = match cached {
            Some(sale) => sale,
            None => self.track(order_id).await?,
        };
        Ok(render_invoice(&sale, store, lang))
    }

    /// Totals for one shop-local day over the mirrored sales.
    pub fn daily_summary(&self, day: NaiveDate) -> SalesSummary {
        summarize_day(self.catalog.sales().iter(), day, local_offset())
    }
}
