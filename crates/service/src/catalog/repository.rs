use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{NewService, Service, ServiceChanges};
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Persistence for the catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Ordered by name, then id.
    async fn list(&self, name_contains: Option<&str>, page: Pagination) -> Result<Vec<Service>, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Service>, ServiceError>;
    async fn create(&self, input: NewService) -> Result<Service, ServiceError>;
    /// `None` when the id does not exist.
    async fn update(&self, id: Uuid, changes: ServiceChanges) -> Result<Option<Service>, ServiceError>;
    /// `false` when the id does not exist; `Conflict` while appointments reference it.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// In-memory repository for tests and local runs without a database.
pub mod mock {
    use super::*;
    use chrono::Utc;
    use dashmap::DashMap;

    #[derive(Default)]
    pub struct MockCatalogRepository {
        services: DashMap<Uuid, Service>,
    }

    impl MockCatalogRepository {
        pub fn new() -> Self { Self::default() }
    }

    #[async_trait]
    impl CatalogRepository for MockCatalogRepository {
        async fn list(&self, name_contains: Option<&str>, page: Pagination) -> Result<Vec<Service>, ServiceError> {
            let needle = name_contains.map(str::to_lowercase);
            let mut all: Vec<Service> = self
                .services
                .iter()
                .filter(|s| needle.as_deref().map_or(true, |n| s.name.to_lowercase().contains(n)))
                .map(|s| s.value().clone())
                .collect();
            all.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            let (_, size) = page.normalize();
            Ok(all.into_iter().skip(page.offset() as usize).take(size as usize).collect())
        }

        async fn get(&self, id: Uuid) -> Result<Option<Service>, ServiceError> {
            Ok(self.services.get(&id).map(|s| s.value().clone()))
        }

        async fn create(&self, input: NewService) -> Result<Service, ServiceError> {
            let now = Utc::now();
            let service = Service {
                id: Uuid::new_v4(),
                name: input.name,
                description: input.description,
                duration_min: input.duration_min,
                created_at: now,
                updated_at: now,
            };
            self.services.insert(service.id, service.clone());
            Ok(service)
        }

        async fn update(&self, id: Uuid, changes: ServiceChanges) -> Result<Option<Service>, ServiceError> {
            let Some(mut entry) = self.services.get_mut(&id) else { return Ok(None) };
            if let Some(name) = changes.name { entry.name = name; }
            if let Some(description) = changes.description { entry.description = description; }
            if let Some(duration) = changes.duration_min { entry.duration_min = duration; }
            entry.updated_at = Utc::now();
            Ok(Some(entry.clone()))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            Ok(self.services.remove(&id).is_some())
        }
    }
}
