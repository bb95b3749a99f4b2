use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use uuid::Uuid;

use models::errors::ModelError;
use models::user::{ActiveModel, Column, Entity};

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::users::domain::{User, UserChanges};
use crate::users::repository::UserRepository;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn map_write_err(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::invalid_field("email", "Email already in use"),
        _ => ServiceError::Db(e.to_string()),
    }
}

#[async_trait::async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn list(&self, page: Pagination) -> Result<Vec<User>, ServiceError> {
        let (idx, size) = page.normalize();
        let rows = Entity::find()
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size)
            .fetch_page(idx)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(Entity::find_by_id(id).one(&self.db).await?.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let res = Entity::find().filter(Column::Email.eq(email)).one(&self.db).await?;
        Ok(res.map(User::from))
    }

    async fn create(&self, name: &str, email: &str) -> Result<User, ServiceError> {
        match models::user::create(&self.db, email, name).await {
            Ok(created) => Ok(created.into()),
            Err(ModelError::Db(e)) => Err(map_write_err(e)),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, ServiceError> {
        let Some(found) = Entity::find_by_id(id).one(&self.db).await? else { return Ok(None) };
        let mut am: ActiveModel = found.into();
        if let Some(name) = changes.name { am.name = Set(name); }
        if let Some(email) = changes.email { am.email = Set(email); }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await.map_err(map_write_err)?;
        Ok(Some(updated.into()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
