use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::service::Model> for Service {
    fn from(m: models::service::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            duration_min: m.duration_min,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_min: Option<i64>,
}

/// Partial update; absent fields are left alone.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_min: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListServicesQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
}

/// Validated values handed to the repository.
#[derive(Clone, Debug, PartialEq)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ServiceChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub duration_min: Option<i32>,
}

impl ServiceChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.duration_min.is_none()
    }
}
