//! Open settlement guard.
//!
//! At most one pending settlement per (trip, debtor, creditor, amount). Inserts
//! use `ON CONFLICT ... WHERE status = 'pending' DO NOTHING` against this index.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(GUARD_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP INDEX IF EXISTS uq_settlements_open_key;")
            .await?;
        Ok(())
    }
}

const GUARD_SQL: &str = r"
CREATE UNIQUE INDEX uq_settlements_open_key
    ON settlements(trip_id, from_user_id, to_user_id, amount_cents)
    WHERE status = 'pending';

-- Lookup of the settled instance of a key
CREATE INDEX idx_settlements_settled_key
    ON settlements(trip_id, from_user_id, to_user_id, amount_cents, settled_at DESC)
    WHERE status = 'settled';
";
