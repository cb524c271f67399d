//! Expense types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tripsplit_shared::types::{ExpenseId, Money, TripId, UserId};

use crate::split::SplitKind;

/// One amount paid by one member and owed by some participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Owning trip.
    pub trip_id: TripId,
    /// What was paid for.
    pub description: String,
    /// Positive amount.
    pub amount: Money,
    /// Member who paid.
    pub paid_by: UserId,
    /// Members who owe a share, in split order.
    pub participants: Vec<UserId>,
    /// Split rule.
    #[serde(rename = "splitType")]
    pub split_kind: SplitKind,
    /// Explicit shares, empty unless the split is unequal.
    pub shares: BTreeMap<UserId, Money>,
    /// Member who recorded the expense.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Set once a settlement between the payer and a participant completes.
    pub settled: bool,
    /// When `settled` was set.
    pub settled_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Returns true if the user owes a share of this expense.
    #[must_use]
    pub fn involves(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Target trip.
    pub trip_id: TripId,
    /// What was paid for.
    pub description: String,
    /// Positive amount.
    pub amount: Money,
    /// Member who paid.
    pub paid_by: UserId,
    /// Members who owe a share.
    pub participants: Vec<UserId>,
    /// Split rule.
    pub split_kind: SplitKind,
    /// Explicit shares for an unequal split.
    pub shares: Option<BTreeMap<UserId, Money>>,
}

/// Partial update of an expense. The trip reference cannot change.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Money>,
    /// New payer.
    pub paid_by: Option<UserId>,
    /// Replacement participant list.
    pub participants: Option<Vec<UserId>>,
    /// New split rule.
    pub split_kind: Option<SplitKind>,
    /// Replacement shares.
    pub shares: Option<BTreeMap<UserId, Money>>,
}
