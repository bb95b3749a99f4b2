use std::sync::Arc;

use chrono::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::domain::{
    parse_instant, Appointment, AppointmentFilter, AppointmentStatus, CreateAppointmentInput, ListAppointmentsQuery,
    NewAppointment,
};
use super::repository::AppointmentRepository;
use crate::auth::identity::Identity;
use crate::auth::policy::{self, Capability};
use crate::catalog::repository::CatalogRepository;
use crate::clock::Clock;
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

const SLOT_TAKEN: &str = "Time slot not available";

/// The booking workflow. Framework independent; every rule about who may do
/// what to an appointment lives here.
pub struct AppointmentService {
    repo: Arc<dyn AppointmentRepository>,
    catalog: Arc<dyn CatalogRepository>,
    clock: Arc<dyn Clock>,
}

impl AppointmentService {
    pub fn new(repo: Arc<dyn AppointmentRepository>, catalog: Arc<dyn CatalogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, catalog, clock }
    }

    /// Operators and admins see everything and may filter by user/service;
    /// everyone else only ever sees their own appointments.
    #[instrument(skip(self, identity, query), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn list(&self, identity: Option<&Identity>, query: ListAppointmentsQuery) -> Result<Page<Appointment>, ServiceError> {
        let identity = policy::authenticated(identity)?;
        let status = query.status.as_deref().filter(|s| !s.trim().is_empty()).map(AppointmentStatus::parse_filter).transpose()?;

        let filter = if identity.is_staff() {
            let service_id = match query.service_id.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(raw) => Some(Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::invalid_field("serviceId", "Invalid serviceId"))?),
                None => None,
            };
            AppointmentFilter { user_id: query.user_id.filter(|u| !u.trim().is_empty()), service_id, status }
        } else {
            AppointmentFilter { user_id: Some(identity.subject.clone()), service_id: None, status }
        };

        let pagination = Pagination::from_query(query.page, query.page_size);
        let items = self.repo.list(&filter, pagination).await?;
        Ok(Page::new(items, pagination))
    }

    #[instrument(skip(self, identity), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn get(&self, identity: Option<&Identity>, id: &str) -> Result<Appointment, ServiceError> {
        let identity = policy::authenticated(identity)?;
        let appointment = self.load(id).await?;
        if !identity.is_staff() && appointment.user_id != identity.subject {
            return Err(ServiceError::Forbidden("Forbidden: not owner".into()));
        }
        Ok(appointment)
    }

    /// Book a slot for the caller. `end_at` is fixed from the service duration
    /// as it is right now and never recomputed.
    #[instrument(skip(self, identity, input), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn create(&self, identity: Option<&Identity>, input: CreateAppointmentInput) -> Result<Appointment, ServiceError> {
        let identity = policy::authenticated(identity)?;

        let raw_service = non_empty(input.service_id.as_deref())
            .ok_or_else(|| ServiceError::invalid_field("serviceId", "serviceId is required"))?;
        let raw_start = non_empty(input.scheduled_for.as_deref())
            .or_else(|| non_empty(input.start_at.as_deref()))
            .ok_or_else(|| ServiceError::invalid_field("scheduledFor", "scheduledFor or startAt is required"))?;
        let invalid_date = || ServiceError::invalid_field("scheduledFor", "Invalid scheduled date");
        let start_at = parse_instant(raw_start).ok_or_else(invalid_date)?;

        let invalid_service = || ServiceError::invalid_field("serviceId", "Invalid serviceId");
        let service_id = Uuid::parse_str(raw_service).map_err(|_| invalid_service())?;
        let service = self.catalog.get(service_id).await?.ok_or_else(invalid_service)?;
        let end_at = start_at
            .checked_add_signed(Duration::minutes(i64::from(service.duration_min)))
            .ok_or_else(invalid_date)?;

        if !self.repo.find_overlapping(service_id, start_at, end_at).await?.is_empty() {
            warn!(service_id = %service_id, start_at = %start_at, "appointment_conflict");
            return Err(ServiceError::Conflict(SLOT_TAKEN.into()));
        }

        let new = NewAppointment { user_id: identity.subject.clone(), service_id, start_at, end_at };
        let created = match self.repo.insert_if_free(new).await {
            Ok(a) => a,
            Err(ServiceError::Conflict(m)) => {
                warn!(service_id = %service_id, start_at = %start_at, "appointment_conflict");
                return Err(ServiceError::Conflict(m));
            }
            Err(e) => return Err(e),
        };
        info!(appointment_id = %created.id, user_id = %created.user_id, service_id = %service_id, start_at = %start_at, end_at = %end_at, "appointment_booked");
        Ok(created)
    }

    /// Operators and admins only. Confirming twice is a no-op.
    pub async fn confirm(&self, identity: Option<&Identity>, id: &str) -> Result<Appointment, ServiceError> {
        self.confirm_reporting(identity, id).await.map(|(appointment, _)| appointment)
    }

    /// Like [`confirm`](Self::confirm), also telling whether the status
    /// actually changed (`false` for an already confirmed appointment).
    #[instrument(skip(self, identity), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn confirm_reporting(&self, identity: Option<&Identity>, id: &str) -> Result<(Appointment, bool), ServiceError> {
        policy::authorize(identity, Capability::Operator)?;
        let appointment = self.load(id).await?;

        if appointment.status == AppointmentStatus::Canceled {
            return Err(ServiceError::InvalidTransition("Cannot confirm a canceled appointment".into()));
        }
        if appointment.start_at <= self.clock.now() {
            return Err(ServiceError::InvalidTransition("Cannot confirm appointments in the past".into()));
        }
        if appointment.status == AppointmentStatus::Confirmed {
            return Ok((appointment, false));
        }

        let updated = self.move_to(&appointment, AppointmentStatus::Confirmed).await?;
        info!(appointment_id = %updated.id, "appointment_confirmed");
        Ok((updated, true))
    }

    /// Owner, operator or admin. Cancellation is terminal.
    #[instrument(skip(self, identity), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn cancel(&self, identity: Option<&Identity>, id: &str) -> Result<Appointment, ServiceError> {
        let identity = policy::authenticated(identity)?;
        let appointment = self.load(id).await?;

        if !identity.is_staff() && appointment.user_id != identity.subject {
            return Err(ServiceError::Forbidden("Forbidden: not owner".into()));
        }
        if appointment.status == AppointmentStatus::Canceled {
            return Err(ServiceError::InvalidTransition("Appointment is already canceled".into()));
        }
        if appointment.start_at <= self.clock.now() {
            return Err(ServiceError::InvalidTransition("Cannot cancel appointments in the past".into()));
        }

        let updated = self.move_to(&appointment, AppointmentStatus::Canceled).await?;
        info!(appointment_id = %updated.id, by = %identity.subject, "appointment_canceled");
        Ok(updated)
    }

    async fn load(&self, id: &str) -> Result<Appointment, ServiceError> {
        let not_found = || ServiceError::not_found("Appointment");
        let id = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;
        self.repo.get(id).await?.ok_or_else(not_found)
    }

    async fn move_to(&self, current: &Appointment, next: AppointmentStatus) -> Result<Appointment, ServiceError> {
        if !current.status.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition(format!("Cannot move appointment from {} to {}", current.status, next)));
        }
        self.repo
            .transition(current.id, current.status, next)
            .await?
            .ok_or_else(|| ServiceError::InvalidTransition("Appointment was modified concurrently".into()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
