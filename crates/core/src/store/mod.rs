//! Ledger Store collaborator contract.
//!
//! The store is the single source of truth for users, trips, expenses and
//! settlements. Beyond plain CRUD it must provide four atomic primitives for
//! the records of a [`SettlementKey`]:
//!
//! - `touch_pending_settlement` bumps `reminded_at` on the open record
//! - `insert_pending_settlement` inserts only if no open record exists
//! - `settle_pending_settlement` flips the open record to settled
//! - `insert_settled_settlement` inserts a settled record only if the key has
//!   no pending or settled record yet
//!
//! At most one open pending record may exist per key, and concurrent
//! `insert_settled_settlement` calls for one key create at most one record. The PostgreSQL store
//! lives in the db crate; [`InMemoryLedgerStore`] backs tests and local runs.

mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tripsplit_shared::types::{ExpenseId, TripId, UserId};

use crate::account::{NewUser, User, UserCredentials};
use crate::expense::Expense;
use crate::settlement::{Settlement, SettlementKey};
use crate::trip::Trip;

pub use memory::InMemoryLedgerStore;

/// Errors surfaced by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate {0}")]
    Duplicate(String),

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

impl StoreError {
    /// Wraps a backend failure.
    pub fn backend(err: impl ToString) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable storage used by the ledger core.
pub trait LedgerStore: Send + Sync + 'static {
    // ========== Users ==========

    /// Inserts a user. Fails with `Duplicate` if the email is taken.
    fn insert_user(&self, user: NewUser) -> impl Future<Output = StoreResult<User>> + Send;

    /// Finds a user by ID.
    fn find_user(&self, id: UserId) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Finds a user and password hash by normalized email.
    fn find_user_credentials(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<UserCredentials>>> + Send;

    /// Returns the users that exist among `ids`, in no particular order.
    fn find_users(&self, ids: &[UserId]) -> impl Future<Output = StoreResult<Vec<User>>> + Send;

    // ========== Trips ==========

    /// Inserts a trip.
    fn insert_trip(&self, trip: Trip) -> impl Future<Output = StoreResult<Trip>> + Send;

    /// Finds a trip by ID.
    fn find_trip(&self, id: TripId) -> impl Future<Output = StoreResult<Option<Trip>>> + Send;

    /// Lists trips the user owns or participates in, oldest first.
    fn list_trips_for_member(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = StoreResult<Vec<Trip>>> + Send;

    /// Replaces a trip. Returns `None` if it no longer exists.
    fn update_trip(&self, trip: Trip) -> impl Future<Output = StoreResult<Option<Trip>>> + Send;

    /// Deletes a trip. Returns whether a row was removed.
    fn delete_trip(&self, id: TripId) -> impl Future<Output = StoreResult<bool>> + Send;

    // ========== Expenses ==========

    /// Inserts an expense.
    fn insert_expense(&self, expense: Expense)
    -> impl Future<Output = StoreResult<Expense>> + Send;

    /// Finds an expense by ID.
    fn find_expense(
        &self,
        id: ExpenseId,
    ) -> impl Future<Output = StoreResult<Option<Expense>>> + Send;

    /// Lists the expenses of the given trips, oldest first.
    fn list_expenses(
        &self,
        trip_ids: &[TripId],
    ) -> impl Future<Output = StoreResult<Vec<Expense>>> + Send;

    /// Replaces an expense. Returns `None` if it no longer exists.
    fn update_expense(
        &self,
        expense: Expense,
    ) -> impl Future<Output = StoreResult<Option<Expense>>> + Send;

    /// Deletes an expense. Returns whether a row was removed.
    fn delete_expense(&self, id: ExpenseId) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Deletes every expense of a trip and returns the count.
    fn delete_expenses_for_trip(
        &self,
        trip_id: TripId,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Marks unsettled expenses of a trip paid by `payer` and shared by
    /// `participant` as settled. Returns the count.
    fn mark_expenses_settled(
        &self,
        trip_id: TripId,
        payer: UserId,
        participant: UserId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    // ========== Settlements ==========

    /// Lists settlement records of a trip, oldest first.
    fn list_settlements(
        &self,
        trip_id: TripId,
    ) -> impl Future<Output = StoreResult<Vec<Settlement>>> + Send;

    /// Sets `reminded_at` on the open pending record for `key`.
    /// Returns `None` when there is no open record.
    fn touch_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<Settlement>>> + Send;

    /// Inserts a pending record unless one is already open for its key.
    /// Returns `None` when another open record won.
    fn insert_pending_settlement(
        &self,
        settlement: Settlement,
    ) -> impl Future<Output = StoreResult<Option<Settlement>>> + Send;

    /// Atomically transitions the open pending record for `key` to settled.
    /// Returns `None` when there is no open record.
    fn settle_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<Settlement>>> + Send;

    /// Inserts `settlement`, already settled, unless any pending or settled
    /// record exists for its key. Returns `None` when one does.
    fn insert_settled_settlement(
        &self,
        settlement: Settlement,
    ) -> impl Future<Output = StoreResult<Option<Settlement>>> + Send;

    /// Finds the most recent settled record for `key`.
    fn find_settled_settlement(
        &self,
        key: SettlementKey,
    ) -> impl Future<Output = StoreResult<Option<Settlement>>> + Send;

    /// Deletes every settlement record of a trip and returns the count.
    fn delete_settlements_for_trip(
        &self,
        trip_id: TripId,
    ) -> impl Future<Output = StoreResult<u64>> + Send;
}
