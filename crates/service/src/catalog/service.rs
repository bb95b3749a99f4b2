use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{CreateServiceInput, ListServicesQuery, NewService, Service, ServiceChanges, UpdateServiceInput};
use super::repository::CatalogRepository;
use crate::appointments::repository::AppointmentRepository;
use crate::auth::identity::Identity;
use crate::auth::policy::{self, Capability};
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

/// Catalog business rules: any caller with an identity may read, only admins write.
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>, appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { repo, appointments }
    }

    pub async fn list(&self, identity: Option<&Identity>, query: ListServicesQuery) -> Result<Page<Service>, ServiceError> {
        policy::authenticated(identity)?;
        let pagination = Pagination::from_query(query.page, query.page_size);
        let name = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        let items = self.repo.list(name, pagination).await?;
        Ok(Page::new(items, pagination))
    }

    pub async fn get(&self, identity: Option<&Identity>, id: &str) -> Result<Service, ServiceError> {
        policy::authenticated(identity)?;
        let id = parse_id(id)?;
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("Service"))
    }

    #[instrument(skip(self, identity, input), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn create(&self, identity: Option<&Identity>, input: CreateServiceInput) -> Result<Service, ServiceError> {
        policy::authorize(identity, Capability::Admin)?;
        let name = input.name.as_deref().unwrap_or_default();
        models::service::validate_name(name).map_err(|e| field_error("name", e))?;
        let duration_min = models::service::validate_duration(input.duration_min.unwrap_or(i64::from(models::service::DEFAULT_DURATION_MIN)))
            .map_err(|e| field_error("durationMin", e))?;
        let new = NewService { name: name.trim().to_string(), description: clean_description(input.description), duration_min };
        let created = self.repo.create(new).await?;
        info!(service_id = %created.id, name = %created.name, duration_min = created.duration_min, "service_created");
        Ok(created)
    }

    #[instrument(skip(self, identity, input), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn update(&self, identity: Option<&Identity>, id: &str, input: UpdateServiceInput) -> Result<Service, ServiceError> {
        policy::authorize(identity, Capability::Admin)?;
        let id = parse_id(id)?;

        let mut changes = ServiceChanges::default();
        if let Some(name) = input.name {
            models::service::validate_name(&name).map_err(|e| field_error("name", e))?;
            changes.name = Some(name.trim().to_string());
        }
        if let Some(minutes) = input.duration_min {
            changes.duration_min = Some(models::service::validate_duration(minutes).map_err(|e| field_error("durationMin", e))?);
        }
        if input.description.is_some() {
            changes.description = Some(clean_description(input.description));
        }

        let updated = if changes.is_empty() {
            self.repo.get(id).await?
        } else {
            self.repo.update(id, changes).await?
        };
        let updated = updated.ok_or_else(|| ServiceError::not_found("Service"))?;
        info!(service_id = %updated.id, "service_updated");
        Ok(updated)
    }

    /// Refused while any appointment, canceled or not, references the service.
    #[instrument(skip(self, identity), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn delete(&self, identity: Option<&Identity>, id: &str) -> Result<(), ServiceError> {
        policy::authorize(identity, Capability::Admin)?;
        let id = parse_id(id)?;
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("Service"));
        }
        if self.appointments.exists_for_service(id).await? {
            return Err(ServiceError::Conflict("Service has appointments".into()));
        }
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("Service"));
        }
        info!(service_id = %id, "service_deleted");
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(id.trim()).map_err(|_| ServiceError::not_found("Service"))
}

fn clean_description(description: Option<String>) -> Option<String> {
    description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())
}

fn field_error(field: &str, e: models::errors::ModelError) -> ServiceError {
    match e {
        models::errors::ModelError::Validation(m) => ServiceError::invalid_field(field, m),
        other => other.into(),
    }
}
