//! # Service Desk
//!
//! On-site service bookings and technician dispatch.
//!
//! ## User Workflow
//! ```text
//! Customer                    Admin                         Technician
//! ────────                    ─────                         ──────────
//! book() ──► SR-###### Pending
//!                             technicians(kind) ──► available, skilled,
//!                                                   best rated first
//!                             assign(id, tech) ──► Assigned
//!                                                           advance(InProgress)
//!                                                           advance(Completed)
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use volta_core::ids::{service_request_id, MAX_ID_ATTEMPTS, SERVICE_REQUEST_PREFIX};
use volta_core::invoice::local_offset;
use volta_core::validation::{normalize_phone, validate_text};
use volta_core::{
    ServiceKind, ServiceRequest, ServiceStatus, Staff, StaffRole, TimeSlot, ValidationError,
};
use volta_store::{encode, Direction, Query, StoreError, Write};

use crate::error::{ShopError, ShopResult};
use crate::remote::collections::{SERVICE_REQUESTS, STAFF};
use crate::remote::Remote;

/// Booking form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub kind: ServiceKind,
    #[serde(default)]
    pub problem: String,
    pub preferred_date: NaiveDate,
    pub preferred_slot: TimeSlot,
}

pub struct ServiceDesk {
    remote: Remote,
}

impl ServiceDesk {
    pub fn new(remote: Remote) -> Self {
        ServiceDesk { remote }
    }

    /// Books a visit. The date may not lie in the past (shop-local time).
    pub async fn book(&self, booking: &Booking) -> ShopResult<ServiceRequest> {
        validate_text("customerName", &booking.customer_name, 100)?;
        validate_text("address", &booking.address, 300)?;
        let phone = normalize_phone(&booking.phone)?;
        if booking.problem.chars().count() > 1000 {
            return Err(ValidationError::TooLong {
                field: "problem".to_string(),
                max: 1000,
            }
            .into());
        }
        let now = Utc::now();
        if booking.preferred_date < now.with_timezone(&local_offset()).date_naive() {
            return Err(ValidationError::InvalidFormat {
                field: "preferredDate".to_string(),
                reason: "date is in the past".to_string(),
            }
            .into());
        }

        let mut request = ServiceRequest {
            id: String::new(),
            customer_name: booking.customer_name.trim().to_string(),
            phone,
            address: booking.address.trim().to_string(),
            kind: booking.kind,
            problem: booking.problem.trim().to_string(),
            preferred_date: booking.preferred_date,
            preferred_slot: booking.preferred_slot,
            status: ServiceStatus::Pending,
            technician_id: None,
            created_at: now,
        };

        for attempt in 1..=MAX_ID_ATTEMPTS {
            request.id = service_request_id(&mut rand::thread_rng());
            let write = Write::create(SERVICE_REQUESTS, request.id.as_str(), encode(&request)?);
            match self.remote.commit(vec![write]).await {
                Ok(()) => {
                    info!(request_id = %request.id, kind = ?request.kind, "Service booked");
                    return Ok(request);
                }
                Err(ShopError::Store(err)) if err.is_conflict() => {
                    warn!(attempt, request_id = %request.id, "Service id taken, regenerating");
                }
                Err(err) => return Err(err),
            }
        }
        Err(ShopError::IdsExhausted {
            prefix: SERVICE_REQUEST_PREFIX.to_string(),
        })
    }

    pub async fn get(&self, request_id: &str) -> ShopResult<ServiceRequest> {
        let data = self
            .remote
            .get(SERVICE_REQUESTS, request_id)
            .await?
            .ok_or_else(|| ShopError::ServiceRequestNotFound(request_id.to_string()))?;
        Ok(serde_json::from_value(data).map_err(StoreError::from)?)
    }

    /// Requests, newest first, optionally only those in `status`.
    pub async fn list(&self, status: Option<ServiceStatus>) -> ShopResult<Vec<ServiceRequest>> {
        let mut query = Query::collection(SERVICE_REQUESTS).order_by("createdAt", Direction::Descending);
        if let Some(status) = status {
            query = query.where_eq("status", json!(status));
        }
        self.remote
            .query(&query)
            .await?
            .iter()
            .map(|doc| doc.decode::<ServiceRequest>().map_err(ShopError::from))
            .collect()
    }

    /// Hands a request to a technician listed in the staff collection.
    pub async fn assign(&self, request_id: &str, technician_id: &str) -> ShopResult<ServiceRequest> {
        let technician = self
            .staff_member(technician_id)
            .await?
            .filter(|staff| staff.role == StaffRole::Technician)
            .ok_or_else(|| ShopError::TechnicianNotFound(technician_id.to_string()))?;

        let mut request = self.get(request_id).await?;
        if !technician.can_do(request.kind) {
            debug!(technician_id, kind = ?request.kind, "Technician lacks the listed skill");
        }
        request.advance_status(ServiceStatus::Assigned)?;
        request.technician_id = Some(technician.id.clone());

        self.remote
            .commit(vec![Write::merge(
                SERVICE_REQUESTS,
                request_id,
                json!({ "status": request.status, "technicianId": technician.id }),
            )])
            .await?;
        info!(request_id, technician_id, "Technician assigned");
        Ok(request)
    }

    pub async fn advance(&self, request_id: &str, next: ServiceStatus) -> ShopResult<ServiceRequest> {
        let mut request = self.get(request_id).await?;
        let from = request.status;
        request.advance_status(next)?;
        self.remote
            .commit(vec![Write::merge(SERVICE_REQUESTS, request_id, json!({ "status": next }))])
            .await?;
        info!(request_id, %from, to = %next, "Service status changed");
        Ok(request)
    }

    // =========================================================================
    // Staff
    // =========================================================================

    async fn staff_member(&self, staff_id: &str) -> ShopResult<Option<Staff>> {
        match self.remote.get(STAFF, staff_id).await? {
            Some(data) => Ok(Some(serde_json::from_value(data).map_err(StoreError::from)?)),
            None => Ok(None),
        }
    }

    /// Adds or replaces a staff record.
    pub async fn save_staff(&self, staff: &Staff) -> ShopResult<()> {
        validate_text("name", &staff.name, 100)?;
        if !(0.0..=5.0).contains(&staff.rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating".to_string(),
                min: 0,
                max: 5,
            }
            .into());
        }
        self.remote
            .commit(vec![Write::set(STAFF, staff.id.as_str(), encode(staff)?)])
            .await?;
        info!(staff_id = %staff.id, role = ?staff.role, "Staff saved");
        Ok(())
    }

    /// Available technicians, best rated first, optionally filtered by skill.
    pub async fn technicians(&self, kind: Option<ServiceKind>) -> ShopResult<Vec<Staff>> {
        let query = Query::collection(STAFF).where_eq("role", "technician");
        let mut technicians: Vec<Staff> = self
            .remote
            .query(&query)
            .await?
            .iter()
            .filter_map(|doc| {
                doc.decode::<Staff>()
                    .inspect_err(|err| warn!(staff_id = %doc.id, %err, "Skipping malformed staff"))
                    .ok()
            })
            .filter(|staff| staff.available)
            .filter(|staff| kind.map_or(true, |kind| staff.can_do(kind)))
            .collect();
        technicians.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(technicians)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use volta_core::CoreError;
    use volta_store::MemoryStore;

    fn booking() -> Booking {
        Booking {
            customer_name: "Selim".to_string(),
            phone: "01611000000".to_string(),
            address: "Khulna".to_string(),
            kind: ServiceKind::SolarInstallation,
            problem: "New 1kW rooftop system".to_string(),
            preferred_date: (Utc::now() + Duration::days(2)).date_naive(),
            preferred_slot: TimeSlot::Morning,
        }
    }

    fn tech(id: &str, rating: f32, skills: &[ServiceKind]) -> Staff {
        Staff {
            id: id.to_string(),
            name: format!("Tech {}", id),
            phone: "01711111111".to_string(),
            role: StaffRole::Technician,
            skills: skills.iter().copied().collect::<BTreeSet<_>>(),
            available: true,
            rating,
        }
    }

    fn desk() -> ServiceDesk {
        ServiceDesk::new(Remote::new(Arc::new(MemoryStore::new())))
    }

    #[tokio::test]
    async fn test_book_assign_complete() {
        let desk = desk();
        desk.save_staff(&tech("t1", 4.5, &[ServiceKind::SolarInstallation]))
            .await
            .unwrap();

        let request = desk.book(&booking()).await.unwrap();
        assert!(request.id.starts_with("SR-"));
        assert_eq!(desk.list(Some(ServiceStatus::Pending)).await.unwrap().len(), 1);

        let assigned = desk.assign(&request.id, "t1").await.unwrap();
        assert_eq!(assigned.technician_id.as_deref(), Some("t1"));

        desk.advance(&request.id, ServiceStatus::InProgress).await.unwrap();
        let done = desk.advance(&request.id, ServiceStatus::Completed).await.unwrap();
        assert_eq!(done.status, ServiceStatus::Completed);
        assert_eq!(desk.get(&request.id).await.unwrap().status, ServiceStatus::Completed);
        assert!(desk.list(Some(ServiceStatus::Pending)).await.unwrap().is_empty());

        let err = desk.advance(&request.id, ServiceStatus::Cancelled).await.unwrap_err();
        assert!(matches!(err, ShopError::Core(CoreError::InvalidStatusTransition { .. })));
    }

    #[tokio::test]
    async fn test_assign_requires_existing_technician() {
        let desk = desk();
        let request = desk.book(&booking()).await.unwrap();
        let err = desk.assign(&request.id, "nobody").await.unwrap_err();
        assert!(matches!(err, ShopError::TechnicianNotFound(_)));
        assert_eq!(desk.get(&request.id).await.unwrap().status, ServiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_past_date_rejected() {
        let mut past = booking();
        past.preferred_date = (Utc::now() - Duration::days(3)).date_naive();
        assert!(desk().book(&past).await.is_err());
    }

    #[tokio::test]
    async fn test_technicians_by_skill_and_rating() {
        let desk = desk();
        desk.save_staff(&tech("t1", 3.9, &[ServiceKind::HouseWiring])).await.unwrap();
        desk.save_staff(&tech("t2", 4.8, &[ServiceKind::HouseWiring, ServiceKind::InverterService]))
            .await
            .unwrap();
        let mut away = tech("t3", 5.0, &[ServiceKind::HouseWiring]);
        away.available = false;
        desk.save_staff(&away).await.unwrap();

        let wiring = desk.technicians(Some(ServiceKind::HouseWiring)).await.unwrap();
        let ids: Vec<&str> = wiring.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["t2", "t1"]);

        let inverter = desk.technicians(Some(ServiceKind::InverterService)).await.unwrap();
        assert_eq!(inverter.len(), 1);
    }
}
