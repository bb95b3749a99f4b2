use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, IsolationLevel,
    PaginatorTrait, QueryFilter, QueryOrder, RuntimeErr, Set, TransactionTrait,
};
use sea_orm::sqlx;
use tracing::warn;
use uuid::Uuid;

use models::appointment::{ActiveModel, Column, Entity, NO_OVERLAP_CONSTRAINT};
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::appointments::domain::{Appointment, AppointmentFilter, AppointmentStatus, NewAppointment};
use crate::appointments::repository::AppointmentRepository;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

const SLOT_TAKEN: &str = "Time slot not available";

pub struct SeaOrmAppointmentRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAppointmentRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn tz(t: DateTime<Utc>) -> DateTimeWithTimeZone { t.into() }

/// SQLSTATEs meaning another booking won the slot.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const EXCLUSION_VIOLATION: &str = "23P01";

/// SQLSTATE and constraint name of a Postgres error, if that is what `e` wraps.
fn database_error(e: &DbErr) -> Option<(String, Option<String>)> {
    let (DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime)) = e else { return None };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db)) => {
            Some((db.code()?.into_owned(), db.constraint().map(str::to_string)))
        }
        _ => None,
    }
}

fn lost_race(e: &DbErr) -> bool {
    match database_error(e) {
        Some((code, _)) if code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED => true,
        Some((code, constraint)) if code == EXCLUSION_VIOLATION => constraint.as_deref() == Some(NO_OVERLAP_CONSTRAINT),
        _ => false,
    }
}

fn map_write_err(e: DbErr) -> ServiceError {
    if lost_race(&e) {
        warn!(error = %e, "booking lost to concurrent writer");
        ServiceError::Conflict(SLOT_TAKEN.into())
    } else {
        ServiceError::Db(e.to_string())
    }
}

async fn overlapping<C: ConnectionTrait>(
    conn: &C,
    service_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<models::appointment::Model>, DbErr> {
    Entity::find()
        .filter(Column::ServiceId.eq(service_id))
        .filter(Column::Status.ne(models::appointment::STATUS_CANCELED))
        .filter(Column::StartAt.lt(tz(end)))
        .filter(Column::EndAt.gt(tz(start)))
        .all(conn)
        .await
}

fn to_domain(rows: Vec<models::appointment::Model>) -> Result<Vec<Appointment>, ServiceError> {
    rows.into_iter().map(Appointment::try_from).collect()
}

#[async_trait::async_trait]
impl AppointmentRepository for SeaOrmAppointmentRepository {
    async fn list(&self, filter: &AppointmentFilter, page: Pagination) -> Result<Vec<Appointment>, ServiceError> {
        let (idx, size) = page.normalize();
        let mut query = Entity::find();
        if let Some(user_id) = &filter.user_id {
            query = query.filter(Column::UserId.eq(user_id.clone()));
        }
        if let Some(service_id) = filter.service_id {
            query = query.filter(Column::ServiceId.eq(service_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_asc(Column::StartAt)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size)
            .fetch_page(idx)
            .await?;
        to_domain(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, ServiceError> {
        Entity::find_by_id(id).one(&self.db).await?.map(Appointment::try_from).transpose()
    }

    async fn find_overlapping(&self, service_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Appointment>, ServiceError> {
        to_domain(overlapping(&self.db, service_id, start, end).await?)
    }

    async fn insert_if_free(&self, new: NewAppointment) -> Result<Appointment, ServiceError> {
        let txn = self.db.begin_with_config(Some(IsolationLevel::Serializable), None).await?;
        if !overlapping(&txn, new.service_id, new.start_at, new.end_at).await.map_err(map_write_err)?.is_empty() {
            txn.rollback().await?;
            return Err(ServiceError::Conflict(SLOT_TAKEN.into()));
        }
        let now = tz(Utc::now());
        let am = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new.user_id),
            service_id: Set(new.service_id),
            start_at: Set(tz(new.start_at)),
            end_at: Set(tz(new.end_at)),
            status: Set(AppointmentStatus::Booked.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let row = am.insert(&txn).await.map_err(map_write_err)?;
        txn.commit().await.map_err(map_write_err)?;
        row.try_into()
    }

    async fn transition(&self, id: Uuid, from: AppointmentStatus, to: AppointmentStatus) -> Result<Option<Appointment>, ServiceError> {
        let res = Entity::update_many()
            .col_expr(Column::Status, Expr::value(to.as_str()))
            .col_expr(Column::UpdatedAt, Expr::value(tz(Utc::now())))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(map_write_err)?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn exists_for_service(&self, service_id: Uuid) -> Result<bool, ServiceError> {
        Ok(Entity::find().filter(Column::ServiceId.eq(service_id)).count(&self.db).await? > 0)
    }

    async fn exists_for_user(&self, user_id: &str) -> Result<bool, ServiceError> {
        Ok(Entity::find().filter(Column::UserId.eq(user_id)).count(&self.db).await? > 0)
    }
}
