//! # Locale Routes
//!
//! ```text
//! GET  /locale          { language }
//! PUT  /locale          { language }
//! POST /locale/toggle   en ⇄ bn
//! GET  /labels/{label}  one label in the active language
//! ```

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;
use volta_core::{Label, Language};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/locale", get(get_locale).put(set_locale))
        .route("/locale/toggle", post(toggle))
        .route("/labels/{label}", get(label))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LocaleBody {
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub struct LabelResponse {
    pub label: Label,
    pub text: &'static str,
}

async fn get_locale(State(shop): State<AppState>) -> Json<LocaleBody> {
    Json(LocaleBody {
        language: shop.locale.get(),
    })
}

async fn set_locale(State(shop): State<AppState>, Json(body): Json<LocaleBody>) -> Json<LocaleBody> {
    shop.locale.set(body.language);
    info!(language = body.language.code(), "Language set");
    Json(body)
}

async fn toggle(State(shop): State<AppState>) -> Json<LocaleBody> {
    Json(LocaleBody {
        language: shop.locale.toggle(),
    })
}

async fn label(State(shop): State<AppState>, Path(label): Path<Label>) -> Json<LabelResponse> {
    Json(LabelResponse {
        label,
        text: label.text(shop.locale.get()),
    })
}
