//! PostgreSQL-backed [`LedgerStore`].

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tripsplit_core::account::{NewUser, User, UserCredentials};
use tripsplit_core::expense::Expense;
use tripsplit_core::settlement::{Settlement, SettlementKey};
use tripsplit_core::store::{LedgerStore, StoreResult};
use tripsplit_core::trip::Trip;
use tripsplit_shared::types::{ExpenseId, TripId, UserId};

use crate::repositories::{
    ExpenseRepository, SettlementRepository, TripRepository, UserRepository,
};

/// Ledger store over a `SeaORM` connection pool.
#[derive(Debug, Clone)]
pub struct DbLedgerStore {
    users: UserRepository,
    trips: TripRepository,
    expenses: ExpenseRepository,
    settlements: SettlementRepository,
}

impl DbLedgerStore {
    /// Creates a store sharing one connection pool across repositories.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            trips: TripRepository::new(db.clone()),
            expenses: ExpenseRepository::new(db.clone()),
            settlements: SettlementRepository::new(db),
        }
    }
}

impl LedgerStore for DbLedgerStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.users.create(user).await
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.users.find_by_id(id).await
    }

    async fn find_user_credentials(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        self.users.find_credentials(email).await
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        self.users.find_many(ids).await
    }

    async fn insert_trip(&self, trip: Trip) -> StoreResult<Trip> {
        self.trips.create(trip).await
    }

    async fn find_trip(&self, id: TripId) -> StoreResult<Option<Trip>> {
        self.trips.find_by_id(id).await
    }

    async fn list_trips_for_member(&self, user_id: UserId) -> StoreResult<Vec<Trip>> {
        self.trips.list_for_member(user_id).await
    }

    async fn update_trip(&self, trip: Trip) -> StoreResult<Option<Trip>> {
        self.trips.replace(trip).await
    }

    async fn delete_trip(&self, id: TripId) -> StoreResult<bool> {
        self.trips.delete(id).await
    }

    async fn insert_expense(&self, expense: Expense) -> StoreResult<Expense> {
        self.expenses.create(expense).await
    }

    async fn find_expense(&self, id: ExpenseId) -> StoreResult<Option<Expense>> {
        self.expenses.find_by_id(id).await
    }

    async fn list_expenses(&self, trip_ids: &[TripId]) -> StoreResult<Vec<Expense>> {
        self.expenses.list_by_trips(trip_ids).await
    }

    async fn update_expense(&self, expense: Expense) -> StoreResult<Option<Expense>> {
        self.expenses.replace(expense).await
    }

    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<bool> {
        self.expenses.delete(id).await
    }

    async fn delete_expenses_for_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        self.expenses.delete_by_trip(trip_id).await
    }

    async fn mark_expenses_settled(
        &self,
        trip_id: TripId,
        payer: UserId,
        participant: UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let marked = self
            .expenses
            .mark_settled(trip_id, payer, participant, at)
            .await?;
        tracing::debug!(%trip_id, %payer, %participant, marked, "expenses marked settled");
        Ok(marked)
    }

    async fn list_settlements(&self, trip_id: TripId) -> StoreResult<Vec<Settlement>> {
        self.settlements.list_by_trip(trip_id).await
    }

    async fn touch_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        self.settlements.touch_pending(key, at).await
    }

    async fn insert_pending_settlement(
        &self,
        settlement: Settlement,
    ) -> StoreResult<Option<Settlement>> {
        let trip_id = settlement.trip_id;
        let inserted = self.settlements.insert_pending(settlement).await?;
        if inserted.is_none() {
            tracing::debug!(%trip_id, "open settlement already exists for key");
        }
        Ok(inserted)
    }

    async fn settle_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        self.settlements.settle_pending(key, at).await
    }

    async fn insert_settled_settlement(
        &self,
        settlement: Settlement,
    ) -> StoreResult<Option<Settlement>> {
        let trip_id = settlement.trip_id;
        let inserted = self.settlements.insert_settled(settlement).await?;
        if inserted.is_none() {
            tracing::debug!(%trip_id, "settlement key already in use");
        }
        Ok(inserted)
    }

    async fn find_settled_settlement(&self, key: SettlementKey) -> StoreResult<Option<Settlement>> {
        self.settlements.find_settled(key).await
    }

    async fn delete_settlements_for_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        self.settlements.delete_by_trip(trip_id).await
    }
}
