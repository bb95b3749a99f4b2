//! Create `appointment` table with FK to `service`.
//!
//! `user_id` holds the token subject of the owner, which is not required to
//! be a row in `user`, so it carries no FK. Services cannot be deleted while
//! appointments reference them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(uuid(Appointment::Id).primary_key())
                    .col(string_len(Appointment::UserId, 255).not_null())
                    .col(uuid(Appointment::ServiceId).not_null())
                    .col(timestamp_with_time_zone(Appointment::StartAt).not_null())
                    .col(timestamp_with_time_zone(Appointment::EndAt).not_null())
                    .col(string_len(Appointment::Status, 16).not_null())
                    .col(timestamp_with_time_zone(Appointment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Appointment::UpdatedAt).not_null())
                    .check(Expr::col(Appointment::EndAt).gt(Expr::col(Appointment::StartAt)))
                    .check(Expr::col(Appointment::Status).is_in(["booked", "confirmed", "canceled"]))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_service")
                            .from(Appointment::Table, Appointment::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appointment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Appointment { Table, Id, UserId, ServiceId, StartAt, EndAt, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Service { Table, Id }
