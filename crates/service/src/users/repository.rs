use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{User, UserChanges};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Ordered by name, then id.
    async fn list(&self, page: Pagination) -> Result<Vec<User>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    /// Duplicate email is a validation error.
    async fn create(&self, name: &str, email: &str) -> Result<User, ServiceError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use dashmap::DashMap;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: DashMap<Uuid, User>,
    }

    impl MockUserRepository {
        pub fn new() -> Self { Self::default() }

        fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
            self.users.iter().any(|u| u.email == email && Some(u.id) != except)
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn list(&self, page: Pagination) -> Result<Vec<User>, ServiceError> {
            let mut all: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
            all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            let (_, size) = page.normalize();
            Ok(all.into_iter().skip(page.offset() as usize).take(size as usize).collect())
        }

        async fn get(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
            Ok(self.users.get(&id).map(|u| u.value().clone()))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
            Ok(self.users.iter().find(|u| u.email == email).map(|u| u.value().clone()))
        }

        async fn create(&self, name: &str, email: &str) -> Result<User, ServiceError> {
            if self.email_taken(email, None) {
                return Err(ServiceError::invalid_field("email", "Email already in use"));
            }
            let now = Utc::now();
            let user = User { id: Uuid::new_v4(), name: name.to_string(), email: email.to_string(), created_at: now, updated_at: now };
            self.users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, ServiceError> {
            if let Some(email) = &changes.email {
                if self.email_taken(email, Some(id)) {
                    return Err(ServiceError::invalid_field("email", "Email already in use"));
                }
            }
            let Some(mut user) = self.users.get_mut(&id) else { return Ok(None) };
            if let Some(name) = changes.name { user.name = name; }
            if let Some(email) = changes.email { user.email = email; }
            user.updated_at = Utc::now();
            Ok(Some(user.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.users.remove(&id).is_some())
        }
    }
}
