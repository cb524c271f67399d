//! In-memory [`LedgerStore`] for tests and local runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tripsplit_shared::types::{ExpenseId, SettlementId, TripId, UserId};

use super::{LedgerStore, StoreError, StoreResult};
use crate::account::{NewUser, User, UserCredentials};
use crate::expense::Expense;
use crate::settlement::{Settlement, SettlementKey, SettlementStatus};
use crate::trip::Trip;

#[derive(Default)]
struct State {
    users: HashMap<UserId, UserCredentials>,
    trips: HashMap<TripId, Trip>,
    expenses: HashMap<ExpenseId, Expense>,
    settlements: HashMap<SettlementId, Settlement>,
}

impl State {
    fn open_pending_mut(&mut self, key: SettlementKey) -> Option<&mut Settlement> {
        self.settlements
            .values_mut()
            .find(|s| s.status == SettlementStatus::Pending && s.key() == key)
    }
}

/// Store that keeps everything behind one mutex.
///
/// Each operation holds the lock for its whole duration, which makes every
/// conditional operation atomic.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<State>,
}

impl std::fmt::Debug for InMemoryLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedgerStore").finish_non_exhaustive()
    }
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

/// Orders records oldest first, breaking ties on the time-ordered id.
fn sorted_by_creation<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

impl LedgerStore for InMemoryLedgerStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.lock()?;
        if state.users.values().any(|c| c.user.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }

        let created = User {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        };
        state.users.insert(
            created.id,
            UserCredentials {
                user: created.clone(),
                password_hash: user.password_hash,
            },
        );
        Ok(created)
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_user_credentials(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|c| c.user.clone()))
            .collect())
    }

    async fn insert_trip(&self, trip: Trip) -> StoreResult<Trip> {
        self.lock()?.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn find_trip(&self, id: TripId) -> StoreResult<Option<Trip>> {
        Ok(self.lock()?.trips.get(&id).cloned())
    }

    async fn list_trips_for_member(&self, user_id: UserId) -> StoreResult<Vec<Trip>> {
        let trips: Vec<Trip> = self
            .lock()?
            .trips
            .values()
            .filter(|t| t.is_member(user_id))
            .cloned()
            .collect();
        Ok(sorted_by_creation(trips, |t| (t.created_at, t.id)))
    }

    async fn update_trip(&self, trip: Trip) -> StoreResult<Option<Trip>> {
        let mut state = self.lock()?;
        Ok(state.trips.get_mut(&trip.id).map(|slot| {
            *slot = trip.clone();
            trip
        }))
    }

    async fn delete_trip(&self, id: TripId) -> StoreResult<bool> {
        Ok(self.lock()?.trips.remove(&id).is_some())
    }

    async fn insert_expense(&self, expense: Expense) -> StoreResult<Expense> {
        self.lock()?.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn find_expense(&self, id: ExpenseId) -> StoreResult<Option<Expense>> {
        Ok(self.lock()?.expenses.get(&id).cloned())
    }

    async fn list_expenses(&self, trip_ids: &[TripId]) -> StoreResult<Vec<Expense>> {
        let expenses: Vec<Expense> = self
            .lock()?
            .expenses
            .values()
            .filter(|e| trip_ids.contains(&e.trip_id))
            .cloned()
            .collect();
        Ok(sorted_by_creation(expenses, |e| (e.created_at, e.id)))
    }

    async fn update_expense(&self, expense: Expense) -> StoreResult<Option<Expense>> {
        let mut state = self.lock()?;
        Ok(state.expenses.get_mut(&expense.id).map(|slot| {
            *slot = expense.clone();
            expense
        }))
    }

    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<bool> {
        Ok(self.lock()?.expenses.remove(&id).is_some())
    }

    async fn delete_expenses_for_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        let mut state = self.lock()?;
        let before = state.expenses.len();
        state.expenses.retain(|_, e| e.trip_id != trip_id);
        Ok((before - state.expenses.len()) as u64)
    }

    async fn mark_expenses_settled(
        &self,
        trip_id: TripId,
        payer: UserId,
        participant: UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut state = self.lock()?;
        let mut count = 0;
        for expense in state.expenses.values_mut().filter(|e| {
            e.trip_id == trip_id && e.paid_by == payer && e.involves(participant) && !e.settled
        }) {
            expense.settled = true;
            expense.settled_at = Some(at);
            count += 1;
        }
        Ok(count)
    }

    async fn list_settlements(&self, trip_id: TripId) -> StoreResult<Vec<Settlement>> {
        let settlements: Vec<Settlement> = self
            .lock()?
            .settlements
            .values()
            .filter(|s| s.trip_id == trip_id)
            .cloned()
            .collect();
        Ok(sorted_by_creation(settlements, |s| (s.created_at, s.id)))
    }

    async fn touch_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        let mut state = self.lock()?;
        Ok(state.open_pending_mut(key).map(|s| {
            s.reminded_at = Some(at);
            s.clone()
        }))
    }

    async fn insert_pending_settlement(
        &self,
        settlement: Settlement,
    ) -> StoreResult<Option<Settlement>> {
        let mut state = self.lock()?;
        if state.open_pending_mut(settlement.key()).is_some() {
            return Ok(None);
        }
        state.settlements.insert(settlement.id, settlement.clone());
        Ok(Some(settlement))
    }

    async fn settle_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        let mut state = self.lock()?;
        Ok(state.open_pending_mut(key).map(|s| {
            s.status = SettlementStatus::Settled;
            s.settled_at = Some(at);
            s.clone()
        }))
    }

    async fn insert_settled_settlement(
        &self,
        settlement: Settlement,
    ) -> StoreResult<Option<Settlement>> {
        let mut state = self.lock()?;
        let key = settlement.key();
        if state.settlements.values().any(|s| s.key() == key) {
            return Ok(None);
        }
        state.settlements.insert(settlement.id, settlement.clone());
        Ok(Some(settlement))
    }

    async fn find_settled_settlement(&self, key: SettlementKey) -> StoreResult<Option<Settlement>> {
        Ok(self
            .lock()?
            .settlements
            .values()
            .filter(|s| s.status == SettlementStatus::Settled && s.key() == key)
            .max_by_key(|s| s.settled_at)
            .cloned())
    }

    async fn delete_settlements_for_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        let mut state = self.lock()?;
        let before = state.settlements.len();
        state.settlements.retain(|_, s| s.trip_id != trip_id);
        Ok((before - state.settlements.len()) as u64)
    }
}
