use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use models::service::{ActiveModel, Column, Entity};

use crate::catalog::domain::{NewService, Service, ServiceChanges};
use crate::catalog::repository::CatalogRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// `%needle%` with LIKE metacharacters escaped, lowercased.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len() + 2);
    out.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

fn map_delete_err(e: DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::Conflict("Service has appointments".into()),
        _ => ServiceError::Db(e.to_string()),
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn list(&self, name_contains: Option<&str>, page: Pagination) -> Result<Vec<Service>, ServiceError> {
        let (idx, size) = page.normalize();
        let mut query = Entity::find();
        if let Some(needle) = name_contains {
            let lowered = Expr::expr(Func::lower(Expr::col(Column::Name)));
            query = query.filter(lowered.like(LikeExpr::new(contains_pattern(needle)).escape('\\')));
        }
        let rows = query
            .order_by_asc(Column::Name)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size)
            .fetch_page(idx)
            .await?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Service>, ServiceError> {
        Ok(Entity::find_by_id(id).one(&self.db).await?.map(Service::from))
    }

    async fn create(&self, input: NewService) -> Result<Service, ServiceError> {
        let created = models::service::create(&self.db, &input.name, input.description.as_deref(), input.duration_min).await?;
        Ok(created.into())
    }

    async fn update(&self, id: Uuid, changes: ServiceChanges) -> Result<Option<Service>, ServiceError> {
        let Some(found) = Entity::find_by_id(id).one(&self.db).await? else { return Ok(None) };
        let mut am: ActiveModel = found.into();
        if let Some(name) = changes.name { am.name = Set(name); }
        if let Some(description) = changes.description { am.description = Set(description); }
        if let Some(duration) = changes.duration_min { am.duration_min = Set(duration); }
        am.updated_at = Set(Utc::now().into());
        Ok(Some(am.update(&self.db).await?.into()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = Entity::delete_by_id(id).exec(&self.db).await.map_err(map_delete_err)?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Hair"), "%hair%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[tokio::test]
    async fn seaorm_catalog_round_trip() -> anyhow::Result<()> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmCatalogRepository::new(db);
        let tag = Uuid::new_v4().simple().to_string();
        let created = repo
            .create(NewService { name: format!("Zeta {tag}"), description: Some("d".into()), duration_min: 20 })
            .await?;

        let found = repo.list(Some(&tag.to_uppercase()), Pagination::default()).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);

        let changed = repo
            .update(created.id, ServiceChanges { duration_min: Some(40), description: Some(None), ..Default::default() })
            .await?
            .expect("exists");
        assert_eq!(changed.duration_min, 40);
        assert_eq!(changed.description, None);

        assert!(repo.delete(created.id).await?);
        assert!(!repo.delete(created.id).await?);
        Ok(())
    }
}
