//! Pairwise balance computation.

use std::collections::BTreeMap;

use serde::Serialize;
use tripsplit_shared::types::{Money, TripId, UserId};

use crate::expense::Expense;
use crate::settlement::Settlement;
use crate::split::{SplitError, compute_split};

/// Net amount between two users.
///
/// `user_a < user_b` always. A positive amount means `user_b` owes `user_a`,
/// a negative one means `user_a` owes `user_b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairBalance {
    /// Lower user ID of the pair.
    pub user_a: UserId,
    /// Higher user ID of the pair.
    pub user_b: UserId,
    /// Signed net amount, never zero.
    pub amount: Money,
}

/// A directed, strictly positive debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    /// Debtor.
    pub from_user_id: UserId,
    /// Creditor.
    pub to_user_id: UserId,
    /// Amount owed.
    pub amount: Money,
}

/// Net balances of one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripBalances {
    /// Trip the balances belong to.
    pub trip_id: TripId,
    /// Non-zero pairs ordered by `(user_a, user_b)`.
    pub pairs: Vec<PairBalance>,
}

impl TripBalances {
    /// Returns each pair as a debt from the owing user to the other.
    #[must_use]
    pub fn debts(&self) -> Vec<Debt> {
        self.pairs
            .iter()
            .map(|p| {
                if p.amount.is_positive() {
                    Debt {
                        from_user_id: p.user_b,
                        to_user_id: p.user_a,
                        amount: p.amount,
                    }
                } else {
                    Debt {
                        from_user_id: p.user_a,
                        to_user_id: p.user_b,
                        amount: p.amount.abs(),
                    }
                }
            })
            .collect()
    }

    /// Returns the signed balance between two users from `a`'s side:
    /// positive if `b` owes `a`.
    #[must_use]
    pub fn between(&self, a: UserId, b: UserId) -> Money {
        let (low, high, sign) = if a < b { (a, b, 1) } else { (b, a, -1) };
        self.pairs
            .iter()
            .find(|p| p.user_a == low && p.user_b == high)
            .map_or(Money::ZERO, |p| {
                if sign > 0 { p.amount } else { -p.amount }
            })
    }
}

#[derive(Default)]
struct PairLedger(BTreeMap<(UserId, UserId), Money>);

impl PairLedger {
    /// Records that `from` owes `to` a further `amount`.
    fn record_debt(
        &mut self,
        from: UserId,
        to: UserId,
        amount: Money,
    ) -> Result<(), SplitError> {
        if from == to || amount.is_zero() {
            return Ok(());
        }
        let (key, next) = if from < to {
            let total = self.0.get(&(from, to)).copied().unwrap_or_default();
            ((from, to), total.checked_sub(amount))
        } else {
            let total = self.0.get(&(to, from)).copied().unwrap_or_default();
            ((to, from), total.checked_add(amount))
        };
        self.0.insert(key, next.ok_or(SplitError::AmountOverflow)?);
        Ok(())
    }

    fn into_pairs(self) -> Vec<PairBalance> {
        self.0
            .into_iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|((user_a, user_b), amount)| PairBalance {
                user_a,
                user_b,
                amount,
            })
            .collect()
    }
}

/// Computes net balances of a trip.
///
/// Every participant's share of an expense is owed to its payer; settled
/// settlements reduce what the debtor owes the creditor. Pending settlements
/// are ignored.
///
/// # Errors
///
/// Returns a [`SplitError`] if a stored expense no longer splits cleanly or a
/// pair total overflows.
pub fn aggregate(
    trip_id: TripId,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> Result<TripBalances, SplitError> {
    let mut ledger = PairLedger::default();

    for expense in expenses.iter().filter(|e| e.trip_id == trip_id) {
        let shares = compute_split(
            expense.amount,
            expense.split_kind,
            &expense.participants,
            Some(&expense.shares),
        )?;
        for share in shares {
            ledger.record_debt(share.user_id, expense.paid_by, share.amount)?;
        }
    }

    for settlement in settlements
        .iter()
        .filter(|s| s.trip_id == trip_id && s.is_settled())
    {
        // Paying back a debt is a debt in the other direction.
        ledger.record_debt(
            settlement.to_user_id,
            settlement.from_user_id,
            settlement.amount,
        )?;
    }

    Ok(TripBalances {
        trip_id,
        pairs: ledger.into_pairs(),
    })
}
