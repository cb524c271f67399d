//! Property-based tests for balance aggregation.
//!
//! - Net positions across a trip always sum to zero
//! - Settling every reported debt leaves no balance

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use proptest::prelude::*;
use tripsplit_shared::types::{ExpenseId, Money, TripId, UserId};

use super::aggregate::aggregate;
use crate::expense::Expense;
use crate::settlement::{Settlement, SettlementKey, SettlementStatus};
use crate::split::SplitKind;

/// (amount in cents, payer index, participant mask) for up to 8 expenses among 4 users.
fn expense_cases() -> impl Strategy<Value = Vec<(i64, usize, u8)>> {
    prop::collection::vec((1i64..1_000_000, 0usize..4, 1u8..16), 1..8)
}

fn build(trip_id: TripId, users: &[UserId], cases: &[(i64, usize, u8)]) -> Vec<Expense> {
    let now = Utc::now();
    cases
        .iter()
        .map(|(amount, payer, mask)| Expense {
            id: ExpenseId::new(),
            trip_id,
            description: "spend".to_string(),
            amount: Money::from_cents(*amount),
            paid_by: users[*payer],
            participants: users
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, u)| *u)
                .collect(),
            split_kind: SplitKind::Equal,
            shares: BTreeMap::new(),
            created_by: users[*payer],
            created_at: now,
            updated_at: now,
            settled: false,
            settled_at: None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// What creditors are owed equals what debtors owe.
    #[test]
    fn prop_net_positions_sum_to_zero(cases in expense_cases()) {
        let trip_id = TripId::new();
        let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
        let balances = aggregate(trip_id, &build(trip_id, &users, &cases), &[]).unwrap();

        let mut net: HashMap<UserId, i64> = HashMap::new();
        for debt in balances.debts() {
            prop_assert!(debt.amount.is_positive());
            *net.entry(debt.from_user_id).or_default() -= debt.amount.cents();
            *net.entry(debt.to_user_id).or_default() += debt.amount.cents();
        }
        prop_assert_eq!(net.values().sum::<i64>(), 0);
    }

    /// Recording every debt as a settled settlement zeroes the trip.
    #[test]
    fn prop_settling_all_debts_clears_balances(cases in expense_cases()) {
        let trip_id = TripId::new();
        let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
        let expenses = build(trip_id, &users, &cases);
        let before = aggregate(trip_id, &expenses, &[]).unwrap();

        let now = Utc::now();
        let settlements: Vec<Settlement> = before
            .debts()
            .into_iter()
            .map(|d| {
                let mut s = Settlement::pending(
                    SettlementKey {
                        trip_id,
                        from_user_id: d.from_user_id,
                        to_user_id: d.to_user_id,
                        amount: d.amount,
                    },
                    d.from_user_id,
                    now,
                );
                s.status = SettlementStatus::Settled;
                s
            })
            .collect();

        let after = aggregate(trip_id, &expenses, &settlements).unwrap();
        prop_assert!(after.pairs.is_empty());
    }
}
