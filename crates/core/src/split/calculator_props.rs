//! Property-based tests for the split calculator.
//!
//! - Equal splits always sum to the expense amount
//! - Unequal splits are accepted exactly when shares sum to the amount

use std::collections::BTreeMap;

use proptest::prelude::*;
use tripsplit_shared::types::{Money, UserId};

use super::calculator::{SplitKind, compute_split};
use super::error::SplitError;

/// Strategy to generate positive amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Money> {
    (1i64..100_000_000i64).prop_map(Money::from_cents)
}

/// Strategy to generate participant lists of 1 to 20 distinct users.
fn participants() -> impl Strategy<Value = Vec<UserId>> {
    (1usize..20).prop_map(|n| (0..n).map(|_| UserId::new()).collect())
}

/// Strategy to generate 1 to 10 non-negative share values.
fn share_values() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..10_000_000, 1..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Equal shares sum to the amount and differ by at most one cent.
    #[test]
    fn prop_equal_split_sums_to_amount(
        amount in positive_amount(),
        people in participants(),
    ) {
        let shares = compute_split(amount, SplitKind::Equal, &people, None).unwrap();

        prop_assert_eq!(shares.len(), people.len());
        let total: Money = shares.iter().map(|s| s.amount).sum();
        prop_assert_eq!(total, amount);

        let max = shares.iter().map(|s| s.amount.cents()).max().unwrap();
        let min = shares.iter().map(|s| s.amount.cents()).min().unwrap();
        prop_assert!(max - min <= 1);
    }

    /// Equal shares are non-increasing, so leftover cents land on the first participants.
    #[test]
    fn prop_equal_split_front_loads_remainder(
        amount in positive_amount(),
        people in participants(),
    ) {
        let shares = compute_split(amount, SplitKind::Equal, &people, None).unwrap();

        for pair in shares.windows(2) {
            prop_assert!(pair[0].amount >= pair[1].amount);
        }
        for (share, user) in shares.iter().zip(&people) {
            prop_assert_eq!(share.user_id, *user);
        }
    }

    /// Shares that sum to the amount are accepted unchanged.
    #[test]
    fn prop_unequal_exact_sum_accepted(values in share_values()) {
        let people: Vec<UserId> = values.iter().map(|_| UserId::new()).collect();
        let total: i64 = values.iter().sum();
        prop_assume!(total > 0);

        let map: BTreeMap<UserId, Money> = people
            .iter()
            .zip(&values)
            .map(|(u, v)| (*u, Money::from_cents(*v)))
            .collect();

        let shares = compute_split(
            Money::from_cents(total),
            SplitKind::Unequal,
            &people,
            Some(&map),
        )
        .unwrap();

        for (share, value) in shares.iter().zip(&values) {
            prop_assert_eq!(share.amount.cents(), *value);
        }
    }

    /// Any cent of drift between the shares and the amount is rejected.
    #[test]
    fn prop_unequal_mismatch_rejected(
        values in share_values(),
        drift in prop_oneof![-1_000i64..0, 1i64..1_000],
    ) {
        let people: Vec<UserId> = values.iter().map(|_| UserId::new()).collect();
        let total: i64 = values.iter().sum::<i64>() + drift;
        prop_assume!(total > 0);

        let map: BTreeMap<UserId, Money> = people
            .iter()
            .zip(&values)
            .map(|(u, v)| (*u, Money::from_cents(*v)))
            .collect();

        let result = compute_split(
            Money::from_cents(total),
            SplitKind::Unequal,
            &people,
            Some(&map),
        );

        let is_mismatch = matches!(result, Err(SplitError::ShareSumMismatch { .. }));
        prop_assert!(is_mismatch);
    }
}
