//! Initial database migration.
//!
//! Creates the users, trips, expenses and settlements tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(TRIPS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(SETTLEMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(320) NOT NULL,
    name VARCHAR(200) NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_users_email UNIQUE (email),
    CONSTRAINT chk_users_email_lower CHECK (email = lower(email))
);
";

const TRIPS_SQL: &str = r"
CREATE TABLE trips (
    id UUID PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    description TEXT,
    owner_id UUID NOT NULL REFERENCES users(id),
    participant_ids JSONB NOT NULL DEFAULT '[]'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_trips_participants_array CHECK (jsonb_typeof(participant_ids) = 'array')
);

-- Owner lookups
CREATE INDEX idx_trips_owner ON trips(owner_id, created_at);

-- Participant containment (participant_ids @> '[id]')
CREATE INDEX idx_trips_participants ON trips USING GIN (participant_ids jsonb_path_ops);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    trip_id UUID NOT NULL REFERENCES trips(id),
    description TEXT NOT NULL,
    amount_cents BIGINT NOT NULL,
    paid_by UUID NOT NULL REFERENCES users(id),
    participants JSONB NOT NULL,
    split_type VARCHAR(16) NOT NULL DEFAULT 'equal',
    shares JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    settled BOOLEAN NOT NULL DEFAULT FALSE,
    settled_at TIMESTAMPTZ,
    CONSTRAINT chk_expenses_amount_positive CHECK (amount_cents > 0),
    CONSTRAINT chk_expenses_split_type CHECK (split_type IN ('equal', 'unequal'))
);

CREATE INDEX idx_expenses_trip ON expenses(trip_id, created_at);

-- Settle side effect: unsettled expenses by payer within a trip
CREATE INDEX idx_expenses_unsettled ON expenses(trip_id, paid_by) WHERE NOT settled;
";

const SETTLEMENTS_SQL: &str = r"
CREATE TABLE settlements (
    id UUID PRIMARY KEY,
    trip_id UUID NOT NULL REFERENCES trips(id),
    from_user_id UUID NOT NULL REFERENCES users(id),
    to_user_id UUID NOT NULL REFERENCES users(id),
    amount_cents BIGINT NOT NULL,
    status VARCHAR(16) NOT NULL,
    initiated_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    reminded_at TIMESTAMPTZ,
    settled_at TIMESTAMPTZ,
    CONSTRAINT chk_settlements_amount_positive CHECK (amount_cents > 0),
    CONSTRAINT chk_settlements_distinct_parties CHECK (from_user_id <> to_user_id),
    CONSTRAINT chk_settlements_status CHECK (status IN ('pending', 'settled')),
    CONSTRAINT chk_settlements_settled_at CHECK ((status = 'settled') = (settled_at IS NOT NULL))
);

CREATE INDEX idx_settlements_trip ON settlements(trip_id, created_at);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS settlements CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS trips CASCADE;
DROP TABLE IF EXISTS users CASCADE;
";
