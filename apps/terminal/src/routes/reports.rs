//! # Report Routes
//!
//! `GET /reports/daily?date=YYYY-MM-DD` (admin). Without a date the current
//! shop-local day is summarized.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use volta_core::invoice::local_offset;
use volta_core::report::SalesSummary;

use super::require_admin;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/daily", get(daily))
}

#[derive(Debug, Deserialize)]
pub struct DailyParams {
    pub date: Option<NaiveDate>,
}

async fn daily(
    State(shop): State<AppState>,
    Query(params): Query<DailyParams>,
) -> ApiResult<Json<SalesSummary>> {
    require_admin(&shop)?;
    let day = params
        .date
        .unwrap_or_else(|| Utc::now().with_timezone(&local_offset()).date_naive());
    Ok(Json(shop.orders.daily_summary(day)))
}
