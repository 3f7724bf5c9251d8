//! # Service Desk Routes
//!
//! Customers book visits; the admin dispatches technicians.
//!
//! ```text
//! POST  /service-requests                    book (public)
//! GET   /service-requests/{id}               status lookup (public)
//! GET   /service-requests?status=…           admin
//! POST  /service-requests/{id}/assign        admin: { technicianId }
//! PATCH /service-requests/{id}/status        admin: { status }
//! GET   /technicians?kind=…                  admin
//! PUT   /staff/{id}                          admin
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use volta_core::{Label, ServiceKind, ServiceRequest, ServiceStatus, Staff};
use volta_sync::Booking;

use super::require_admin;
use crate::error::{ApiResult, Localize};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/service-requests", post(book).get(list_requests))
        .route("/service-requests/{id}", get(get_request))
        .route("/service-requests/{id}/assign", post(assign))
        .route("/service-requests/{id}/status", patch(advance))
        .route("/technicians", get(technicians))
        .route("/staff/{id}", put(save_staff))
}

#[derive(Debug, Serialize)]
pub struct Booked {
    pub request: ServiceRequest,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<ServiceStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub technician_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ServiceStatus,
}

#[derive(Debug, Deserialize)]
pub struct TechnicianParams {
    pub kind: Option<ServiceKind>,
}

async fn book(
    State(shop): State<AppState>,
    Json(booking): Json<Booking>,
) -> ApiResult<(StatusCode, Json<Booked>)> {
    let request = shop.service_desk.book(&booking).await.localized(&shop)?;
    Ok((
        StatusCode::CREATED,
        Json(Booked {
            request,
            message: Label::ServiceBooked.text(shop.locale.get()),
        }),
    ))
}

async fn get_request(
    State(shop): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ServiceRequest>> {
    shop.service_desk.get(&id).await.localized(&shop).map(Json)
}

async fn list_requests(
    State(shop): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<ServiceRequest>>> {
    require_admin(&shop)?;
    shop.service_desk
        .list(params.status)
        .await
        .localized(&shop)
        .map(Json)
}

async fn assign(
    State(shop): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Json<ServiceRequest>> {
    require_admin(&shop)?;
    shop.service_desk
        .assign(&id, &request.technician_id)
        .await
        .localized(&shop)
        .map(Json)
}

async fn advance(
    State(shop): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<ServiceRequest>> {
    require_admin(&shop)?;
    shop.service_desk
        .advance(&id, request.status)
        .await
        .localized(&shop)
        .map(Json)
}

async fn technicians(
    State(shop): State<AppState>,
    Query(params): Query<TechnicianParams>,
) -> ApiResult<Json<Vec<Staff>>> {
    require_admin(&shop)?;
    shop.service_desk
        .technicians(params.kind)
        .await
        .localized(&shop)
        .map(Json)
}

async fn save_staff(
    State(shop): State<AppState>,
    Path(id): Path<String>,
    Json(mut staff): Json<Staff>,
) -> ApiResult<Json<Staff>> {
    require_admin(&shop)?;
    staff.id = id;
    shop.service_desk.save_staff(&staff).await.localized(&shop)?;
    Ok(Json(staff))
}
