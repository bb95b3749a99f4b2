use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{CreateUserInput, ListUsersQuery, UpdateUserInput, User, UserChanges};
use super::repository::UserRepository;
use crate::appointments::repository::AppointmentRepository;
use crate::auth::identity::Identity;
use crate::auth::policy::{self, Capability};
use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    appointments: Arc<dyn AppointmentRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, appointments: Arc<dyn AppointmentRepository>) -> Self {
        Self { repo, appointments }
    }

    pub async fn list(&self, identity: Option<&Identity>, query: ListUsersQuery) -> Result<Page<User>, ServiceError> {
        policy::authorize(identity, Capability::Admin)?;
        let pagination = Pagination::from_query(query.page, query.page_size);
        Ok(Page::new(self.repo.list(pagination).await?, pagination))
    }

    /// Self (token subject equal to the id) or admin.
    pub async fn get(&self, identity: Option<&Identity>, id: &str) -> Result<User, ServiceError> {
        policy::authorize(identity, Capability::SelfOrAdmin(id.trim()))?;
        let id = parse_id(id)?;
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("User"))
    }

    #[instrument(skip(self, identity, input), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn create(&self, identity: Option<&Identity>, input: CreateUserInput) -> Result<User, ServiceError> {
        policy::authorize(identity, Capability::Admin)?;
        let name = checked_name(input.name.as_deref().unwrap_or_default())?;
        let email = checked_email(input.email.as_deref().unwrap_or_default())?;
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::invalid_field("email", "Email already in use"));
        }
        let user = self.repo.create(&name, &email).await?;
        info!(user_id = %user.id, email = %user.email, "user_created");
        Ok(user)
    }

    #[instrument(skip(self, identity, input), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn update(&self, identity: Option<&Identity>, id: &str, input: UpdateUserInput) -> Result<User, ServiceError> {
        policy::authorize(identity, Capability::SelfOrAdmin(id.trim()))?;
        let id = parse_id(id)?;

        let changes = UserChanges {
            name: input.name.as_deref().map(checked_name).transpose()?,
            email: input.email.as_deref().map(checked_email).transpose()?,
        };
        if let Some(email) = &changes.email {
            if matches!(self.repo.find_by_email(email).await?, Some(other) if other.id != id) {
                return Err(ServiceError::invalid_field("email", "Email already in use"));
            }
        }

        let updated = if changes.is_empty() { self.repo.get(id).await? } else { self.repo.update(id, changes).await? };
        let updated = updated.ok_or_else(|| ServiceError::not_found("User"))?;
        info!(user_id = %updated.id, "user_updated");
        Ok(updated)
    }

    /// Refused while the user owns appointments.
    #[instrument(skip(self, identity), fields(sub = identity.map(|i| i.subject.as_str())))]
    pub async fn delete(&self, identity: Option<&Identity>, id: &str) -> Result<(), ServiceError> {
        policy::authorize(identity, Capability::Admin)?;
        let id = parse_id(id)?;
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("User"));
        }
        if self.appointments.exists_for_user(&id.to_string()).await? {
            return Err(ServiceError::Conflict("User has appointments".into()));
        }
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("User"));
        }
        info!(user_id = %id, "user_deleted");
        Ok(())
    }
}

fn parse_id(id: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(id.trim()).map_err(|_| ServiceError::not_found("User"))
}

fn checked_name(name: &str) -> Result<String, ServiceError> {
    models::user::validate_name(name).map_err(|_| ServiceError::invalid_field("name", "name is required (max 128 chars)"))?;
    Ok(name.trim().to_string())
}

/// Emails are stored trimmed and lowercased so uniqueness is case-insensitive.
fn checked_email(email: &str) -> Result<String, ServiceError> {
    let email = email.trim().to_lowercase();
    models::user::validate_email(&email).map_err(|_| ServiceError::invalid_field("email", "Invalid email"))?;
    Ok(email)
}
