//! # Advisor Route
//!
//! `POST /advisor { prompt, lang? }` always answers 200: a missing key or a
//! failed call yields the localized fallback text.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;
use volta_core::Language;

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/advisor", post(ask))
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
    #[serde(default)]
    pub lang: Option<Language>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    pub configured: bool,
}

async fn ask(State(shop): State<AppState>, Json(request): Json<AskRequest>) -> Json<AskResponse> {
    let lang = request.lang.unwrap_or_else(|| shop.locale.get());
    debug!(chars = request.prompt.chars().count(), ?lang, "advisor_ask");
    Json(AskResponse {
        answer: shop.advisor.ask(&request.prompt, lang).await,
        configured: shop.advisor.is_configured(),
    })
}
