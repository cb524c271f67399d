//! Expense operations on the ledger.
//!
//! Every write goes membership check, then split validation, then store.

use std::collections::BTreeMap;

use chrono::Utc;
use tripsplit_shared::types::{ExpenseId, Money, TripId, UserId};

use super::types::{CreateExpenseInput, Expense, ExpensePatch};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::membership::check_all_members;
use crate::notify::Notifier;
use crate::split::{SplitKind, compute_split, shares_by_user};
use crate::store::LedgerStore;
use crate::trip::Trip;

fn normalize_description(description: &str) -> LedgerResult<String> {
    let description = description.trim();
    if description.is_empty() {
        return Err(LedgerError::InvalidInput("description is required".into()));
    }
    Ok(description.to_string())
}

/// Validates the split of an expense and returns the shares to persist.
///
/// Equal splits persist an empty map; the shares are recomputed when needed.
fn validated_shares(
    trip: &Trip,
    amount: Money,
    paid_by: UserId,
    participants: &[UserId],
    kind: SplitKind,
    shares: Option<&BTreeMap<UserId, Money>>,
) -> LedgerResult<BTreeMap<UserId, Money>> {
    let normalized = compute_split(amount, kind, participants, shares)?;
    check_all_members(trip, std::iter::once(paid_by).chain(participants.iter().copied()))?;

    Ok(match kind {
        SplitKind::Equal => BTreeMap::new(),
        SplitKind::Unequal => shares_by_user(&normalized),
    })
}

impl<S: LedgerStore, N: Notifier> Ledger<S, N> {
    /// Lists expenses of one trip, or of every trip the caller belongs to.
    pub async fn list_expenses(
        &self,
        trip_id: Option<TripId>,
        caller: UserId,
    ) -> LedgerResult<Vec<Expense>> {
        let trip_ids = match trip_id {
            Some(trip_id) => vec![self.is_member(trip_id, caller).await?.id],
            None => self
                .store
                .list_trips_for_member(caller)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect(),
        };

        if trip_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.list_expenses(&trip_ids).await?)
    }

    /// Records an expense. Caller must be a member of the target trip.
    pub async fn create_expense(
        &self,
        caller: UserId,
        input: CreateExpenseInput,
    ) -> LedgerResult<Expense> {
        let trip = self.is_member(input.trip_id, caller).await?;
        let description = normalize_description(&input.description)?;
        let shares = validated_shares(
            &trip,
            input.amount,
            input.paid_by,
            &input.participants,
            input.split_kind,
            input.shares.as_ref(),
        )?;

        let now = Utc::now();
        let expense = Expense {
            id: ExpenseId::new(),
            trip_id: trip.id,
            description,
            amount: input.amount,
            paid_by: input.paid_by,
            participants: input.participants,
            split_kind: input.split_kind,
            shares,
            created_by: caller,
            created_at: now,
            updated_at: now,
            settled: false,
            settled_at: None,
        };

        Ok(self.store.insert_expense(expense).await?)
    }

    /// Merges a patch into an expense and re-validates the result.
    pub async fn update_expense(
        &self,
        expense_id: ExpenseId,
        caller: UserId,
        patch: ExpensePatch,
    ) -> LedgerResult<Expense> {
        let mut expense = self.load_expense(expense_id).await?;
        let trip = self.is_member(expense.trip_id, caller).await?;

        if let Some(description) = patch.description {
            expense.description = normalize_description(&description)?;
        }
        if let Some(amount) = patch.amount {
            expense.amount = amount;
        }
        if let Some(paid_by) = patch.paid_by {
            expense.paid_by = paid_by;
        }
        if let Some(participants) = patch.participants {
            expense.participants = participants;
        }
        if let Some(kind) = patch.split_kind {
            expense.split_kind = kind;
        }
        if let Some(shares) = patch.shares {
            expense.shares = shares;
        }

        expense.shares = validated_shares(
            &trip,
            expense.amount,
            expense.paid_by,
            &expense.participants,
            expense.split_kind,
            Some(&expense.shares),
        )?;
        expense.updated_at = Utc::now();

        self.store
            .update_expense(expense)
            .await?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))
    }

    /// Deletes an expense. Caller must be a member of its trip.
    pub async fn delete_expense(&self, expense_id: ExpenseId, caller: UserId) -> LedgerResult<()> {
        let expense = self.load_expense(expense_id).await?;
        self.is_member(expense.trip_id, caller).await?;

        if self.store.delete_expense(expense_id).await? {
            Ok(())
        } else {
            Err(LedgerError::ExpenseNotFound(expense_id))
        }
    }

    async fn load_expense(&self, expense_id: ExpenseId) -> LedgerResult<Expense> {
        self.store
            .find_expense(expense_id)
            .await?
            .ok_or(LedgerError::ExpenseNotFound(expense_id))
    }
}
