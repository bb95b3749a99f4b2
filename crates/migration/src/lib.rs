//! Migrator registering entity-specific migrations in dependency order.
//! Indexes and the overlap constraint are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_service;
mod m20240101_000003_create_appointment;
mod m20240101_000004_add_indexes;
mod m20240101_000005_appointment_no_overlap;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_service::Migration),
            Box::new(m20240101_000003_create_appointment::Migration),
            Box::new(m20240101_000004_add_indexes::Migration),
            Box::new(m20240101_000005_appointment_no_overlap::Migration),
        ]
    }
}
