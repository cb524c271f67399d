//! Expense repository for database operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Statement,
};
use tripsplit_core::expense::Expense;
use tripsplit_core::split::SplitKind;
use tripsplit_core::store::{StoreError, StoreResult};
use tripsplit_shared::types::{ExpenseId, Money, TripId, UserId};

use super::json::{ids_from_json, ids_to_json, shares_from_json, shares_to_json};
use crate::entities::expenses;

/// Flags unsettled expenses paid by `$2` and shared by `$3` within trip `$1`.
const MARK_SETTLED_SQL: &str = r"
UPDATE expenses
SET settled = TRUE, settled_at = $4
WHERE trip_id = $1
  AND paid_by = $2
  AND participants @> $3
  AND NOT settled
";

/// Expense repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an expense.
    pub async fn create(&self, expense: Expense) -> StoreResult<Expense> {
        let model = to_model(&expense)
            .into_active_model()
            .reset_all()
            .insert(&self.db)
            .await
            .map_err(StoreError::backend)?;

        to_domain(model)
    }

    /// Finds an expense by ID.
    pub async fn find_by_id(&self, id: ExpenseId) -> StoreResult<Option<Expense>> {
        expenses::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?
            .map(to_domain)
            .transpose()
    }

    /// Lists expenses of the given trips, oldest first.
    pub async fn list_by_trips(&self, trip_ids: &[TripId]) -> StoreResult<Vec<Expense>> {
        expenses::Entity::find()
            .filter(expenses::Column::TripId.is_in(trip_ids.iter().map(|id| id.into_inner())))
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(&self.db)
            .await
            .map_err(StoreError::backend)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Replaces every column of an expense. Returns `None` if the row is gone.
    pub async fn replace(&self, expense: Expense) -> StoreResult<Option<Expense>> {
        let result = to_model(&expense)
            .into_active_model()
            .reset_all()
            .update(&self.db)
            .await;

        match result {
            Ok(model) => to_domain(model).map(Some),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(StoreError::backend(e)),
        }
    }

    /// Deletes an expense by ID.
    pub async fn delete(&self, id: ExpenseId) -> StoreResult<bool> {
        let result = expenses::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected > 0)
    }

    /// Deletes every expense of a trip.
    pub async fn delete_by_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::TripId.eq(trip_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(result.rows_affected)
    }

    /// Marks matching unsettled expenses as settled.
    pub async fn mark_settled(
        &self,
        trip_id: TripId,
        payer: UserId,
        participant: UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            MARK_SETTLED_SQL,
            [
                trip_id.into_inner().into(),
                payer.into_inner().into(),
                ids_to_json(&[participant]).into(),
                at.fixed_offset().into(),
            ],
        );

        let result = self.db.execute(stmt).await.map_err(StoreError::backend)?;
        Ok(result.rows_affected())
    }
}

fn to_model(expense: &Expense) -> expenses::Model {
    expenses::Model {
        id: expense.id.into_inner(),
        trip_id: expense.trip_id.into_inner(),
        description: expense.description.clone(),
        amount_cents: expense.amount.cents(),
        paid_by: expense.paid_by.into_inner(),
        participants: ids_to_json(&expense.participants),
        split_type: expense.split_kind.as_str().to_string(),
        shares: shares_to_json(&expense.shares),
        created_by: expense.created_by.into_inner(),
        created_at: expense.created_at.into(),
        updated_at: expense.updated_at.into(),
        settled: expense.settled,
        settled_at: expense.settled_at.map(Into::into),
    }
}

fn to_domain(model: expenses::Model) -> StoreResult<Expense> {
    let split_kind = SplitKind::parse(&model.split_type).ok_or_else(|| {
        StoreError::Backend(format!("unknown split type {}", model.split_type))
    })?;

    Ok(Expense {
        id: ExpenseId::from_uuid(model.id),
        trip_id: TripId::from_uuid(model.trip_id),
        description: model.description,
        amount: Money::from_cents(model.amount_cents),
        paid_by: UserId::from_uuid(model.paid_by),
        participants: ids_from_json(model.participants)?,
        split_kind,
        shares: shares_from_json(model.shares)?,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.to_utc(),
        updated_at: model.updated_at.to_utc(),
        settled: model.settled,
        settled_at: model.settled_at.map(|t| t.to_utc()),
    })
}
