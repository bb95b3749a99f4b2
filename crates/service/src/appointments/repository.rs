use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::domain::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Persistence for appointments.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Ordered by `start_at`, then id.
    async fn list(&self, filter: &AppointmentFilter, page: Pagination) -> Result<Vec<Appointment>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, ServiceError>;
    /// Live (non-canceled) appointments on `service_id` overlapping `[start, end)`.
    async fn find_overlapping(&self, service_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, ServiceError>;
    /// Re-check for overlap and insert atomically. `Conflict` when the slot is taken.
    async fn insert_if_free(&self, new: NewAppointment) -> Result<Appointment, ServiceError>;
    /// Move `id` from `from` to `to` only if it is still in `from`. `None` when
    /// the row is missing or its status changed underneath.
    async fn transition(&self, id: Uuid, from: AppointmentStatus, to: AppointmentStatus) -> Result<Option<Appointment>, ServiceError>;
    async fn exists_for_service(&self, service_id: Uuid) -> Result<bool, ServiceError>;
    async fn exists_for_user(&self, user_id: &str) -> Result<bool, ServiceError>;
}

/// In-memory repository for tests and local runs without a database.
pub mod mock {
    use super::*;
    use dashmap::DashMap;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MockAppointmentRepository {
        rows: DashMap<Uuid, Appointment>,
        // Serializes check-then-insert the way the database transaction does.
        write_lock: Mutex<()>,
    }

    impl MockAppointmentRepository {
        pub fn new() -> Self { Self::default() }

        /// Insert a row verbatim, bypassing overlap checks. For seeding tests.
        pub fn seed(&self, appointment: Appointment) { self.rows.insert(appointment.id, appointment); }

        fn overlapping(&self, service_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Appointment> {
            self.rows
                .iter()
                .filter(|a| a.service_id == service_id && a.is_live() && a.overlaps(start, end))
                .map(|a| a.value().clone())
                .collect()
        }
    }

    #[async_trait]
    impl AppointmentRepository for MockAppointmentRepository {
        async fn list(&self, filter: &AppointmentFilter, page: Pagination) -> Result<Vec<Appointment>, ServiceError> {
            let mut all: Vec<Appointment> = self.rows.iter().filter(|a| filter.matches(a)).map(|a| a.value().clone()).collect();
            all.sort_by(|a, b| a.start_at.cmp(&b.start_at).then(a.id.cmp(&b.id)));
            let (_, size) = page.normalize();
            Ok(all.into_iter().skip(page.offset() as usize).take(size as usize).collect())
        }

        async fn get(&self, id: Uuid) -> Result<Option<Appointment>, ServiceError> {
            Ok(self.rows.get(&id).map(|a| a.value().clone()))
        }

        async fn find_overlapping(&self, service_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, ServiceError> {
            Ok(self.overlapping(service_id, start, end))
        }

        async fn insert_if_free(&self, new: NewAppointment) -> Result<Appointment, ServiceError> {
            let _guard = self.write_lock.lock().await;
            if !self.overlapping(new.service_id, new.start_at, new.end_at).is_empty() {
                return Err(ServiceError::Conflict("Time slot not available".into()));
            }
            let now = Utc::now();
            let appointment = Appointment {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                service_id: new.service_id,
                start_at: new.start_at,
                end_at: new.end_at,
                status: AppointmentStatus::Booked,
                created_at: now,
                updated_at: now,
            };
            self.rows.insert(appointment.id, appointment.clone());
            Ok(appointment)
        }

        async fn transition(&self, id: Uuid, from: AppointmentStatus, to: AppointmentStatus) -> Result<Option<Appointment>, ServiceError> {
            let Some(mut row) = self.rows.get_mut(&id) else { return Ok(None) };
            if row.status != from {
                return Ok(None);
            }
            row.status = to;
            row.updated_at = Utc::now();
            Ok(Some(row.clone()))
        }

        async fn exists_for_service(&self, service_id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.rows.iter().any(|a| a.service_id == service_id))
        }

        async fn exists_for_user(&self, user_id: &str) -> Result<bool, ServiceError> {
            Ok(self.rows.iter().any(|a| a.user_id == user_id))
        }
    }
}
