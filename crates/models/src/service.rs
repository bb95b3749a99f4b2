use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{appointment, errors};

/// Used when a service is created without an explicit duration.
pub const DEFAULT_DURATION_MIN: i32 = 30;
/// One day; longer services are rejected.
pub const MAX_DURATION_MIN: i32 = 24 * 60;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub duration_min: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Appointment }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Appointment => Entity::has_many(appointment::Entity).into() }
    }
}

impl Related<appointment::Entity> for Entity {
    fn to() -> RelationDef { Relation::Appointment.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    if name.chars().count() > 128 { return Err(errors::ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

pub fn validate_duration(minutes: i64) -> Result<i32, errors::ModelError> {
    if minutes <= 0 {
        return Err(errors::ModelError::Validation("durationMin must be a positive integer".into()));
    }
    if minutes > i64::from(MAX_DURATION_MIN) {
        return Err(errors::ModelError::Validation(format!("durationMin must be <= {MAX_DURATION_MIN}")));
    }
    i32::try_from(minutes).map_err(|_| errors::ModelError::Validation("durationMin out of range".into()))
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<&str>,
    duration_min: i32,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    validate_duration(i64::from(duration_min))?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
        description: Set(description.map(str::to_string)),
        duration_min: Set(duration_min),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_bounds() {
        assert_eq!(validate_duration(30).unwrap(), 30);
        assert_eq!(validate_duration(1440).unwrap(), 1440);
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-5).is_err());
        assert!(validate_duration(1441).is_err());
    }
}
