use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owner listing
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_user")
                    .table(Appointment::Table)
                    .col(Appointment::UserId)
                    .col(Appointment::StartAt)
                    .to_owned(),
            )
            .await?;

        // Conflict lookups: (service_id, start_at)
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_service_start")
                    .table(Appointment::Table)
                    .col(Appointment::ServiceId)
                    .col(Appointment::StartAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_name")
                    .table(Service::Table)
                    .col(Service::Name)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_appointment_user").table(Appointment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_service_start").table(Appointment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_service_name").table(Service::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Appointment { Table, UserId, ServiceId, StartAt }

#[derive(DeriveIden)]
enum Service { Table, Name }
