//! Balance queries on the ledger.

use tripsplit_shared::types::{TripId, UserId};

use super::aggregate::{TripBalances, aggregate};
use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::notify::Notifier;
use crate::store::LedgerStore;

impl<S: LedgerStore, N: Notifier> Ledger<S, N> {
    /// Computes net pairwise balances of a trip. Member only.
    pub async fn net_balances(&self, trip_id: TripId, caller: UserId) -> LedgerResult<TripBalances> {
        self.is_member(trip_id, caller).await?;

        let expenses = self.store.list_expenses(&[trip_id]).await?;
        let settlements = self.store.list_settlements(trip_id).await?;

        Ok(aggregate(trip_id, &expenses, &settlements)?)
    }
}
