//! Settlement repository for database operations.
//!
//! The three open-key operations are single SQL statements. Together with the
//! `uq_settlements_open_key` partial unique index they keep at most one
//! pending record per key, and let exactly one of two racing writers move it
//! to settled.
//!
//! A record created already settled has no index to lean on, so
//! `insert_settled` serializes writers of one key on a transaction-scoped
//! advisory lock and inserts only when the key has no pending or settled row.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, Statement, TransactionTrait, Value,
};
use tripsplit_core::settlement::{Settlement, SettlementKey, SettlementStatus};
use tripsplit_core::store::{StoreError, StoreResult};
use tripsplit_shared::types::{Money, SettlementId, TripId, UserId};

use crate::entities::settlements;

const TOUCH_PENDING_SQL: &str = r"
UPDATE settlements
SET reminded_at = $5
WHERE trip_id = $1 AND from_user_id = $2 AND to_user_id = $3 AND amount_cents = $4
  AND status = 'pending'
RETURNING *
";

const INSERT_PENDING_SQL: &str = r"
INSERT INTO settlements
    (id, trip_id, from_user_id, to_user_id, amount_cents, status,
     initiated_by, created_at, reminded_at, settled_at)
VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, NULL)
ON CONFLICT (trip_id, from_user_id, to_user_id, amount_cents) WHERE status = 'pending'
DO NOTHING
RETURNING *
";

const SETTLE_PENDING_SQL: &str = r"
UPDATE settlements
SET status = 'settled', settled_at = $5
WHERE trip_id = $1 AND from_user_id = $2 AND to_user_id = $3 AND amount_cents = $4
  AND status = 'pending'
RETURNING *
";

const KEY_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

const INSERT_SETTLED_SQL: &str = r"
INSERT INTO settlements
    (id, trip_id, from_user_id, to_user_id, amount_cents, status,
     initiated_by, created_at, reminded_at, settled_at)
SELECT $1, $2, $3, $4, $5, 'settled', $6, $7, NULL, $8
WHERE NOT EXISTS (
    SELECT 1 FROM settlements
    WHERE trip_id = $2 AND from_user_id = $3 AND to_user_id = $4 AND amount_cents = $5
      AND status IN ('pending', 'settled')
)
RETURNING *
";

/// Settlement repository.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    db: DatabaseConnection,
}

impl SettlementRepository {
    /// Creates a new settlement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists settlement records of a trip, oldest first.
    pub async fn list_by_trip(&self, trip_id: TripId) -> StoreResult<Vec<Settlement>> {
        settlements::Entity::find()
            .filter(settlements::Column::TripId.eq(trip_id.into_inner()))
            .order_by_asc(settlements::Column::CreatedAt)
            .order_by_asc(settlements::Column::Id)
            .all(&self.db)
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Bumps `reminded_at` on the open record for `key`.
    pub async fn touch_pending(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        self.returning_one(TOUCH_PENDING_SQL, key_values(key, at))
            .await
    }

    /// Inserts a pending record unless one is already open for its key.
    pub async fn insert_pending(&self, settlement: Settlement) -> StoreResult<Option<Settlement>> {
        let values = vec![
            settlement.id.into_inner().into(),
            settlement.trip_id.into_inner().into(),
            settlement.from_user_id.into_inner().into(),
            settlement.to_user_id.into_inner().into(),
            settlement.amount.cents().into(),
            settlement.initiated_by.into_inner().into(),
            settlement.created_at.fixed_offset().into(),
            settlement.reminded_at.map(|t| t.fixed_offset()).into(),
        ];

        self.returning_one(INSERT_PENDING_SQL, values).await
    }

    /// Inserts a settled record unless the key already has a pending or
    /// settled one.
    pub async fn insert_settled(&self, settlement: Settlement) -> StoreResult<Option<Settlement>> {
        let key = settlement.key();
        let lock_key = format!(
            "settlement:{}:{}:{}:{}",
            key.trip_id,
            key.from_user_id,
            key.to_user_id,
            key.amount.cents()
        );
        let values = vec![
            settlement.id.into_inner().into(),
            settlement.trip_id.into_inner().into(),
            settlement.from_user_id.into_inner().into(),
            settlement.to_user_id.into_inner().into(),
            settlement.amount.cents().into(),
            settlement.initiated_by.into_inner().into(),
            settlement.created_at.fixed_offset().into(),
            settlement
                .settled_at
                .unwrap_or(settlement.created_at)
                .fixed_offset()
                .into(),
        ];

        let txn = self.db.begin().await.map_err(StoreError::backend)?;

        txn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            KEY_LOCK_SQL,
            [Value::from(lock_key)],
        ))
        .await
        .map_err(StoreError::backend)?;

        // Runs as its own statement so it sees rows committed while we waited
        // for the lock.
        let inserted = settlements::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                INSERT_SETTLED_SQL,
                values,
            ))
            .one(&txn)
            .await
            .map_err(StoreError::backend)?;

        txn.commit().await.map_err(StoreError::backend)?;

        inserted.map(to_domain).transpose()
    }

    /// Transitions the open record for `key` to settled.
    pub async fn settle_pending(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        self.returning_one(SETTLE_PENDING_SQL, key_values(key, at))
            .await
    }

    /// Finds the most recently settled record for `key`.
    pub async fn find_settled(&self, key: SettlementKey) -> StoreResult<Option<Settlement>> {
        settlements::Entity::find()
            .filter(settlements::Column::TripId.eq(key.trip_id.into_inner()))
            .filter(settlements::Column::FromUserId.eq(key.from_user_id.into_inner()))
            .filter(settlements::Column::ToUserId.eq(key.to_user_id.into_inner()))
            .filter(settlements::Column::AmountCents.eq(key.amount.cents()))
            .filter(settlements::Column::Status.eq(SettlementStatus::Settled.as_str()))
            .order_by_desc(settlements::Column::SettledAt)
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?
            .map(to_domain)
            .transpose()
    }

    /// Deletes every settlement record of a trip.
    pub async fn delete_by_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        let result = settlements::Entity::delete_many()
            .filter(settlements::Column::TripId.eq(trip_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected)
    }

    async fn returning_one(&self, sql: &str, values: Vec<Value>) -> StoreResult<Option<Settlement>> {
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        settlements::Entity::find()
            .from_raw_sql(stmt)
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?
            .map(to_domain)
            .transpose()
    }
}

fn key_values(key: SettlementKey, at: DateTime<Utc>) -> Vec<Value> {
    vec![
        key.trip_id.into_inner().into(),
        key.from_user_id.into_inner().into(),
        key.to_user_id.into_inner().into(),
        key.amount.cents().into(),
        at.fixed_offset().into(),
    ]
}

fn to_domain(model: settlements::Model) -> StoreResult<Settlement> {
    let status = SettlementStatus::parse(&model.status).ok_or_else(|| {
        StoreError::Backend(format!("unknown settlement status {}", model.status))
    })?;

    Ok(Settlement {
        id: SettlementId::from_uuid(model.id),
        trip_id: TripId::from_uuid(model.trip_id),
        from_user_id: UserId::from_uuid(model.from_user_id),
        to_user_id: UserId::from_uuid(model.to_user_id),
        amount: Money::from_cents(model.amount_cents),
        status,
        initiated_by: UserId::from_uuid(model.initiated_by),
        created_at: model.created_at.to_utc(),
        reminded_at: model.reminded_at.map(|t| t.to_utc()),
        settled_at: model.settled_at.map(|t| t.to_utc()),
    })
}
