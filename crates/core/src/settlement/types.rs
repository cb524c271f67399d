//! Settlement types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tripsplit_shared::types::{Money, SettlementId, TripId, UserId};

/// Lifecycle state of a settlement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    /// Debt requested, not yet paid.
    Pending,
    /// Debt paid. Terminal.
    Settled,
}

impl SettlementStatus {
    /// Returns the storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Settled => "settled",
        }
    }

    /// Parses the storage name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "settled" => Some(Self::Settled),
            _ => None,
        }
    }
}

impl fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one settlement instance. A different amount is a different instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettlementKey {
    /// Trip the debt belongs to.
    pub trip_id: TripId,
    /// Debtor.
    pub from_user_id: UserId,
    /// Creditor.
    pub to_user_id: UserId,
    /// Positive amount.
    pub amount: Money,
}

/// A debt between two trip members and its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Settlement ID.
    pub id: SettlementId,
    /// Trip the debt belongs to.
    pub trip_id: TripId,
    /// Debtor.
    pub from_user_id: UserId,
    /// Creditor.
    pub to_user_id: UserId,
    /// Positive amount.
    pub amount: Money,
    /// Current state.
    pub status: SettlementStatus,
    /// Member who created the record.
    pub initiated_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last reminder time.
    pub reminded_at: Option<DateTime<Utc>>,
    /// Transition to settled.
    pub settled_at: Option<DateTime<Utc>>,
}

impl Settlement {
    /// Creates a pending record for a key.
    #[must_use]
    pub fn pending(key: SettlementKey, initiated_by: UserId, at: DateTime<Utc>) -> Self {
        Self {
            id: SettlementId::new(),
            trip_id: key.trip_id,
            from_user_id: key.from_user_id,
            to_user_id: key.to_user_id,
            amount: key.amount,
            status: SettlementStatus::Pending,
            initiated_by,
            created_at: at,
            reminded_at: Some(at),
            settled_at: None,
        }
    }

    /// Creates a record for a key that is settled on creation.
    #[must_use]
    pub fn settled(key: SettlementKey, initiated_by: UserId, at: DateTime<Utc>) -> Self {
        Self {
            status: SettlementStatus::Settled,
            reminded_at: None,
            settled_at: Some(at),
            ..Self::pending(key, initiated_by, at)
        }
    }

    /// Returns the dedup key of this record.
    #[must_use]
    pub const fn key(&self) -> SettlementKey {
        SettlementKey {
            trip_id: self.trip_id,
            from_user_id: self.from_user_id,
            to_user_id: self.to_user_id,
            amount: self.amount,
        }
    }

    /// Returns true once the record is settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status == SettlementStatus::Settled
    }
}

/// Result of a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindOutcome {
    /// The open pending record.
    pub settlement: Settlement,
    /// True if this call created the record instead of bumping it.
    pub created: bool,
    /// Delivery failure, if any. The ledger change stands regardless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// How a settle call reached the settled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleTransition {
    /// An open pending record was settled.
    Transitioned,
    /// No record existed, one was created and settled.
    SettledDirectly,
    /// The key was already settled. Nothing changed.
    AlreadySettled,
}

impl SettleTransition {
    /// Returns true if this call changed the ledger.
    #[must_use]
    pub const fn changed(self) -> bool {
        !matches!(self, Self::AlreadySettled)
    }
}

/// Result of a settle call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleOutcome {
    /// The settled record.
    pub settlement: Settlement,
    /// Which path was taken.
    pub transition: SettleTransition,
    /// Expenses flagged settled by this call.
    pub expenses_marked: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        for status in [SettlementStatus::Pending, SettlementStatus::Settled] {
            assert_eq!(SettlementStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(SettlementStatus::parse("cancelled"), None);
    }

    #[test]
    fn test_pending_sets_reminded_at() {
        let now = Utc::now();
        let key = SettlementKey {
            trip_id: TripId::new(),
            from_user_id: UserId::new(),
            to_user_id: UserId::new(),
            amount: Money::from_cents(5_000),
        };
        let s = Settlement::pending(key, key.from_user_id, now);

        assert_eq!(s.status, SettlementStatus::Pending);
        assert_eq!(s.created_at, now);
        assert_eq!(s.reminded_at, Some(now));
        assert!(s.settled_at.is_none());
        assert_eq!(s.key(), key);
    }

    #[test]
    fn test_already_settled_is_not_a_change() {
        assert!(SettleTransition::Transitioned.changed());
        assert!(SettleTransition::SettledDirectly.changed());
        assert!(!SettleTransition::AlreadySettled.changed());
    }
}
