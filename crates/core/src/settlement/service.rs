//! Settlement operations on the ledger.

use std::collections::HashMap;

use chrono::Utc;
use tripsplit_shared::types::{TripId, UserId};

use super::notice::reminder_email;
use super::types::{RemindOutcome, SettleOutcome, SettleTransition, Settlement, SettlementKey};
use crate::account::User;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::membership::check_all_members;
use crate::notify::Notifier;
use crate::store::{LedgerStore, StoreError};

/// Attempts before giving up on a key that keeps changing underneath us.
const MAX_ATTEMPTS: usize = 3;

/// Debtor, creditor and caller, loaded once per call.
struct Parties {
    debtor: User,
    creditor: User,
    caller: User,
}

fn contention(key: &SettlementKey) -> LedgerError {
    LedgerError::Store(StoreError::Backend(format!(
        "settlement {} -> {} in trip {} kept changing",
        key.from_user_id, key.to_user_id, key.trip_id
    )))
}

impl<S: LedgerStore, N: Notifier> Ledger<S, N> {
    /// Requests payment of a debt.
    ///
    /// Bumps `reminded_at` on the open pending record for the key, or creates
    /// one. Sends exactly one reminder; a delivery failure is returned as a
    /// warning and does not undo the ledger change.
    pub async fn remind(&self, caller: UserId, key: SettlementKey) -> LedgerResult<RemindOutcome> {
        let parties = self.validate_settlement(caller, key).await?;

        let mut outcome = None;
        for _ in 0..MAX_ATTEMPTS {
            let now = Utc::now();
            if let Some(settlement) = self.store.touch_pending_settlement(key, now).await? {
                outcome = Some((settlement, false));
                break;
            }
            let fresh = Settlement::pending(key, caller, now);
            if let Some(settlement) = self.store.insert_pending_settlement(fresh).await? {
                outcome = Some((settlement, true));
                break;
            }
        }
        let (settlement, created) = outcome.ok_or_else(|| contention(&key))?;

        let email = reminder_email(&parties.debtor, &parties.creditor, key.amount, &parties.caller);
        let warning = self.notifier.send(&email).await.err().map(|e| e.to_string());

        Ok(RemindOutcome {
            settlement,
            created,
            warning,
        })
    }

    /// Marks a debt as paid.
    ///
    /// Transitions the open pending record if there is one, otherwise creates
    /// the record already settled. When the key is already settled and nothing
    /// is pending, this is a successful no-op. Racing callers produce exactly
    /// one settled record.
    pub async fn settle(&self, caller: UserId, key: SettlementKey) -> LedgerResult<SettleOutcome> {
        self.validate_settlement(caller, key).await?;

        for _ in 0..MAX_ATTEMPTS {
            let now = Utc::now();

            if let Some(settlement) = self.store.settle_pending_settlement(key, now).await? {
                return self
                    .finish_settle(settlement, SettleTransition::Transitioned)
                    .await;
            }

            let fresh = Settlement::settled(key, caller, now);
            if let Some(settlement) = self.store.insert_settled_settlement(fresh).await? {
                return self
                    .finish_settle(settlement, SettleTransition::SettledDirectly)
                    .await;
            }

            if let Some(settlement) = self.store.find_settled_settlement(key).await? {
                return Ok(SettleOutcome {
                    settlement,
                    transition: SettleTransition::AlreadySettled,
                    expenses_marked: 0,
                });
            }
            // A pending record appeared between the two steps.
        }

        Err(contention(&key))
    }

    /// Lists every settlement record of a trip. Member only.
    pub async fn list_settlements(
        &self,
        trip_id: TripId,
        caller: UserId,
    ) -> LedgerResult<Vec<Settlement>> {
        self.is_member(trip_id, caller).await?;
        Ok(self.store.list_settlements(trip_id).await?)
    }

    async fn finish_settle(
        &self,
        settlement: Settlement,
        transition: SettleTransition,
    ) -> LedgerResult<SettleOutcome> {
        let at = settlement.settled_at.unwrap_or_else(Utc::now);
        let expenses_marked = self
            .store
            .mark_expenses_settled(
                settlement.trip_id,
                settlement.to_user_id,
                settlement.from_user_id,
                at,
            )
            .await?;

        Ok(SettleOutcome {
            settlement,
            transition,
            expenses_marked,
        })
    }

    async fn validate_settlement(&self, caller: UserId, key: SettlementKey) -> LedgerResult<Parties> {
        if !key.amount.is_positive() {
            return Err(LedgerError::InvalidInput(
                "settlement amount must be positive".into(),
            ));
        }
        if key.from_user_id == key.to_user_id {
            return Err(LedgerError::SelfSettlement);
        }

        let trip = self.is_member(key.trip_id, caller).await?;
        check_all_members(&trip, [key.from_user_id, key.to_user_id])?;

        let ids = [key.from_user_id, key.to_user_id, caller];
        let users: HashMap<UserId, User> = self
            .store
            .find_users(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let take = |id: UserId| {
            users
                .get(&id)
                .cloned()
                .ok_or(LedgerError::UserNotFound(id))
        };

        Ok(Parties {
            debtor: take(key.from_user_id)?,
            creditor: take(key.to_user_id)?,
            caller: take(caller)?,
        })
    }
}
