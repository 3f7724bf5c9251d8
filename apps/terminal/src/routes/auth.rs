//! # Auth Routes
//!
//! ```text
//! POST /auth/login      { identifier, password } ──► session | 401
//! POST /auth/register   { phone, name, email?, address, password, role? }
//! POST /auth/logout
//! GET  /auth/session    current session or null
//! PUT  /auth/profile    customer: name / email / address
//! ```
//!
//! A failed login always answers with the same generic message.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use volta_core::{Label, ProfileUpdate, Role, UserProfile};
use volta_sync::{Registration, Session};

use crate::error::{ApiError, ApiResult, ErrorCode, Localize};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
        .route("/auth/profile", put(update_profile))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub form: Registration,
    pub password: String,
    #[serde(default = "customer")]
    pub role: Role,
}

fn customer() -> Role {
    Role::Customer
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

async fn login(
    State(shop): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<Session>> {
    shop.auth
        .login(&request.identifier, &request.password)
        .await
        .localized(&shop)?
        .map(Json)
        .ok_or_else(|| {
            ApiError::label(
                ErrorCode::Unauthorized,
                Label::InvalidCredentials,
                shop.locale.get(),
            )
        })
}

async fn register(
    State(shop): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let profile = shop
        .auth
        .register(&request.form, &request.password, request.role)
        .await
        .localized(&shop)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn logout(State(shop): State<AppState>) -> Json<LogoutResponse> {
    shop.auth.logout();
    Json(LogoutResponse {
        message: Label::LoggedOut.text(shop.locale.get()),
    })
}

async fn session(State(shop): State<AppState>) -> Json<Option<Session>> {
    Json(shop.auth.current())
}

async fn update_profile(
    State(shop): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    shop.auth
        .update_profile(&update)
        .await
        .localized(&shop)
        .map(Json)
}
