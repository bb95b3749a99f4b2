//! Exclusion constraint: two live appointments on the same service may not
//! overlap as half-open `[start_at, end_at)` ranges. Canceled rows are exempt.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        // btree_gist provides the `=` operator class for uuid inside a GiST index.
        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS btree_gist").await?;
        db.execute_unprepared(
            r#"ALTER TABLE "appointment"
               ADD CONSTRAINT "appointment_no_overlap"
               EXCLUDE USING gist (
                   "service_id" WITH =,
                   tstzrange("start_at", "end_at", '[)') WITH &&
               ) WHERE ("status" <> 'canceled')"#,
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"ALTER TABLE "appointment" DROP CONSTRAINT IF EXISTS "appointment_no_overlap""#)
            .await?;
        Ok(())
    }
}
