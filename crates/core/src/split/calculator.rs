//! Expense split validation and normalization.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tripsplit_shared::types::{Money, UserId};

use super::allocation::allocate_equal;
use super::error::SplitError;

/// How an expense amount divides across participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    /// Everyone owes the same amount, leftover cents to the first participants.
    #[default]
    Equal,
    /// Explicit per-participant shares.
    Unequal,
}

impl SplitKind {
    /// Returns the wire/storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Unequal => "unequal",
        }
    }

    /// Parses the wire/storage name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "equal" => Some(Self::Equal),
            "unequal" => Some(Self::Unequal),
            _ => None,
        }
    }
}

/// One participant's normalized share of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantShare {
    /// Participant.
    pub user_id: UserId,
    /// Amount owed for this expense.
    pub amount: Money,
}

/// Computes the normalized shares of an expense.
///
/// The result has one entry per participant, in participant order, and its
/// amounts sum to `amount` exactly. For [`SplitKind::Equal`] any `shares` map is
/// ignored. For [`SplitKind::Unequal`] participants missing from `shares` owe
/// zero.
///
/// # Errors
///
/// Returns a [`SplitError`] when participants are empty or duplicated, the
/// amount is not positive, or unequal shares are missing, negative, keyed by a
/// non-participant or do not sum to the amount.
pub fn compute_split(
    amount: Money,
    kind: SplitKind,
    participants: &[UserId],
    shares: Option<&BTreeMap<UserId, Money>>,
) -> Result<Vec<ParticipantShare>, SplitError> {
    if participants.is_empty() {
        return Err(SplitError::EmptyParticipants);
    }
    if !amount.is_positive() {
        return Err(SplitError::NonPositiveAmount(amount));
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for user_id in participants {
        if !seen.insert(*user_id) {
            return Err(SplitError::DuplicateParticipant(*user_id));
        }
    }

    match kind {
        SplitKind::Equal => Ok(participants
            .iter()
            .zip(allocate_equal(amount, participants.len()))
            .map(|(user_id, amount)| ParticipantShare {
                user_id: *user_id,
                amount,
            })
            .collect()),
        SplitKind::Unequal => {
            let shares = shares
                .filter(|s| !s.is_empty())
                .ok_or(SplitError::MissingShares)?;
            validate_unequal(amount, &seen, shares)?;

            Ok(participants
                .iter()
                .map(|user_id| ParticipantShare {
                    user_id: *user_id,
                    amount: shares.get(user_id).copied().unwrap_or(Money::ZERO),
                })
                .collect())
        }
    }
}

fn validate_unequal(
    amount: Money,
    participants: &HashSet<UserId>,
    shares: &BTreeMap<UserId, Money>,
) -> Result<(), SplitError> {
    let mut total = Money::ZERO;

    for (user_id, share) in shares {
        if !participants.contains(user_id) {
            return Err(SplitError::UnknownShareParticipant(*user_id));
        }
        if share.is_negative() {
            return Err(SplitError::NegativeShare {
                user_id: *user_id,
                amount: *share,
            });
        }
        total = total
            .checked_add(*share)
            .ok_or(SplitError::AmountOverflow)?;
    }

    if total != amount {
        return Err(SplitError::ShareSumMismatch {
            expected: amount,
            actual: total,
        });
    }

    Ok(())
}

/// Collects normalized shares into the map persisted on an expense.
#[must_use]
pub fn shares_by_user(shares: &[ParticipantShare]) -> BTreeMap<UserId, Money> {
    shares.iter().map(|s| (s.user_id, s.amount)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn users(n: usize) -> Vec<UserId> {
        (0..n).map(|_| UserId::new()).collect()
    }

    fn cents(shares: &[ParticipantShare]) -> Vec<i64> {
        shares.iter().map(|s| s.amount.cents()).collect()
    }

    #[test]
    fn test_equal_split_two_ways() {
        let people = users(2);
        let shares =
            compute_split(Money::from_cents(10_000), SplitKind::Equal, &people, None).unwrap();

        assert_eq!(cents(&shares), vec![5_000, 5_000]);
        assert_eq!(shares[0].user_id, people[0]);
        assert_eq!(shares[1].user_id, people[1]);
    }

    #[test]
    fn test_equal_split_extra_cent_goes_first() {
        let people = users(3);
        let shares =
            compute_split(Money::from_cents(10_000), SplitKind::Equal, &people, None).unwrap();

        assert_eq!(cents(&shares), vec![3_334, 3_333, 3_333]);
    }

    #[test]
    fn test_unequal_split_with_decimal_amounts() {
        let people = users(2);
        let money = |d| Money::from_decimal(d).unwrap();
        let mut map = BTreeMap::new();
        map.insert(people[0], money(dec!(12.34)));
        map.insert(people[1], money(dec!(7.66)));

        let shares =
            compute_split(money(dec!(20.00)), SplitKind::Unequal, &people, Some(&map)).unwrap();

        assert_eq!(cents(&shares), vec![1_234, 766]);
    }

    #[test]
    fn test_equal_split_ignores_shares() {
        let people = users(2);
        let mut bogus = BTreeMap::new();
        bogus.insert(UserId::new(), Money::from_cents(1));

        let shares = compute_split(
            Money::from_cents(1_000),
            SplitKind::Equal,
            &people,
            Some(&bogus),
        )
        .unwrap();

        assert_eq!(cents(&shares), vec![500, 500]);
    }

    #[test]
    fn test_unequal_split_exact_sum() {
        let people = users(3);
        let mut map = BTreeMap::new();
        map.insert(people[0], Money::from_cents(6_000));
        map.insert(people[1], Money::from_cents(4_000));

        let shares = compute_split(
            Money::from_cents(10_000),
            SplitKind::Unequal,
            &people,
            Some(&map),
        )
        .unwrap();

        assert_eq!(cents(&shares), vec![6_000, 4_000, 0]);
    }

    #[rstest]
    #[case(9_999)]
    #[case(10_001)]
    fn test_unequal_split_sum_mismatch(#[case] second: i64) {
        let people = users(2);
        let mut map = BTreeMap::new();
        map.insert(people[0], Money::from_cents(5_000));
        map.insert(people[1], Money::from_cents(second - 5_000));

        let result = compute_split(
            Money::from_cents(10_000),
            SplitKind::Unequal,
            &people,
            Some(&map),
        );

        assert!(matches!(
            result,
            Err(SplitError::ShareSumMismatch { expected, .. }) if expected.cents() == 10_000
        ));
    }

    #[test]
    fn test_unequal_split_unknown_participant() {
        let people = users(2);
        let outsider = UserId::new();
        let mut map = BTreeMap::new();
        map.insert(people[0], Money::from_cents(5_000));
        map.insert(outsider, Money::from_cents(5_000));

        let result = compute_split(
            Money::from_cents(10_000),
            SplitKind::Unequal,
            &people,
            Some(&map),
        );

        assert_eq!(result, Err(SplitError::UnknownShareParticipant(outsider)));
    }

    #[test]
    fn test_unequal_split_negative_share() {
        let people = users(2);
        let mut map = BTreeMap::new();
        map.insert(people[0], Money::from_cents(11_000));
        map.insert(people[1], Money::from_cents(-1_000));

        let result = compute_split(
            Money::from_cents(10_000),
            SplitKind::Unequal,
            &people,
            Some(&map),
        );

        assert!(matches!(result, Err(SplitError::NegativeShare { .. })));
    }

    #[rstest]
    #[case(None)]
    #[case(Some(BTreeMap::new()))]
    fn test_unequal_split_requires_shares(#[case] shares: Option<BTreeMap<UserId, Money>>) {
        let people = users(2);
        let result = compute_split(
            Money::from_cents(10_000),
            SplitKind::Unequal,
            &people,
            shares.as_ref(),
        );
        assert_eq!(result, Err(SplitError::MissingShares));
    }

    #[rstest]
    #[case(0)]
    #[case(-500)]
    fn test_rejects_non_positive_amount(#[case] amount: i64) {
        let result = compute_split(Money::from_cents(amount), SplitKind::Equal, &users(2), None);
        assert!(matches!(result, Err(SplitError::NonPositiveAmount(_))));
    }

    #[test]
    fn test_rejects_empty_participants() {
        let result = compute_split(Money::from_cents(100), SplitKind::Equal, &[], None);
        assert_eq!(result, Err(SplitError::EmptyParticipants));
    }

    #[test]
    fn test_rejects_duplicate_participants() {
        let user = UserId::new();
        let result = compute_split(
            Money::from_cents(100),
            SplitKind::Equal,
            &[user, user],
            None,
        );
        assert_eq!(result, Err(SplitError::DuplicateParticipant(user)));
    }

    #[test]
    fn test_split_kind_names() {
        assert_eq!(SplitKind::parse("equal"), Some(SplitKind::Equal));
        assert_eq!(SplitKind::parse(SplitKind::Unequal.as_str()), Some(SplitKind::Unequal));
        assert_eq!(SplitKind::parse("percent"), None);
        assert_eq!(
            serde_json::to_value(SplitKind::Unequal).ok(),
            Some(serde_json::json!("unequal"))
        );
    }
}
