//! Settlement flows against the in-memory store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rstest::rstest;
use tripsplit_shared::types::{ExpenseId, Money, TripId, UserId};

use super::types::{SettleTransition, Settlement, SettlementKey, SettlementStatus};
use crate::account::{NewUser, SignupInput, User, UserCredentials};
use crate::error::LedgerError;
use crate::expense::{CreateExpenseInput, Expense};
use crate::ledger::Ledger;
use crate::notify::RecordingNotifier;
use crate::split::SplitKind;
use crate::store::{InMemoryLedgerStore, LedgerStore, StoreResult};
use crate::trip::{CreateTripInput, Trip};

type TestLedger = Ledger<InMemoryLedgerStore, RecordingNotifier>;

/// Shares an in-memory store but gives the scheduler `yields` turns before
/// every call, so concurrent callers interleave between store operations.
struct YieldingStore {
    inner: Arc<InMemoryLedgerStore>,
    yields: usize,
}

impl YieldingStore {
    async fn pause(&self) {
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
    }
}

impl LedgerStore for YieldingStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        self.pause().await;
        self.inner.insert_user(user).await
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.pause().await;
        self.inner.find_user(id).await
    }

    async fn find_user_credentials(&self, email: &str) -> StoreResult<Option<UserCredentials>> {
        self.pause().await;
        self.inner.find_user_credentials(email).await
    }

    async fn find_users(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        self.pause().await;
        self.inner.find_users(ids).await
    }

    async fn insert_trip(&self, trip: Trip) -> StoreResult<Trip> {
        self.pause().await;
        self.inner.insert_trip(trip).await
    }

    async fn find_trip(&self, id: TripId) -> StoreResult<Option<Trip>> {
        self.pause().await;
        self.inner.find_trip(id).await
    }

    async fn list_trips_for_member(&self, user_id: UserId) -> StoreResult<Vec<Trip>> {
        self.pause().await;
        self.inner.list_trips_for_member(user_id).await
    }

    async fn update_trip(&self, trip: Trip) -> StoreResult<Option<Trip>> {
        self.pause().await;
        self.inner.update_trip(trip).await
    }

    async fn delete_trip(&self, id: TripId) -> StoreResult<bool> {
        self.pause().await;
        self.inner.delete_trip(id).await
    }

    async fn insert_expense(&self, expense: Expense) -> StoreResult<Expense> {
        self.pause().await;
        self.inner.insert_expense(expense).await
    }

    async fn find_expense(&self, id: ExpenseId) -> StoreResult<Option<Expense>> {
        self.pause().await;
        self.inner.find_expense(id).await
    }

    async fn list_expenses(&self, trip_ids: &[TripId]) -> StoreResult<Vec<Expense>> {
        self.pause().await;
        self.inner.list_expenses(trip_ids).await
    }

    async fn update_expense(&self, expense: Expense) -> StoreResult<Option<Expense>> {
        self.pause().await;
        self.inner.update_expense(expense).await
    }

    async fn delete_expense(&self, id: ExpenseId) -> StoreResult<bool> {
        self.pause().await;
        self.inner.delete_expense(id).await
    }

    async fn delete_expenses_for_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        self.pause().await;
        self.inner.delete_expenses_for_trip(trip_id).await
    }

    async fn mark_expenses_settled(
        &self,
        trip_id: TripId,
        payer: UserId,
        participant: UserId,
        at: DateTime<Utc>,
    ) -> StoreResult<u64> {
        self.pause().await;
        self.inner
            .mark_expenses_settled(trip_id, payer, participant, at)
            .await
    }

    async fn list_settlements(&self, trip_id: TripId) -> StoreResult<Vec<Settlement>> {
        self.pause().await;
        self.inner.list_settlements(trip_id).await
    }

    async fn touch_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        self.pause().await;
        self.inner.touch_pending_settlement(key, at).await
    }

    async fn insert_pending_settlement(
        &self,
        settlement: Settlement,
    ) -> StoreResult<Option<Settlement>> {
        self.pause().await;
        self.inner.insert_pending_settlement(settlement).await
    }

    async fn settle_pending_settlement(
        &self,
        key: SettlementKey,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<Settlement>> {
        self.pause().await;
        self.inner.settle_pending_settlement(key, at).await
    }

    async fn insert_settled_settlement(
        &self,
        settlement: Settlement,
    ) -> StoreResult<Option<Settlement>> {
        self.pause().await;
        self.inner.insert_settled_settlement(settlement).await
    }

    async fn find_settled_settlement(&self, key: SettlementKey) -> StoreResult<Option<Settlement>> {
        self.pause().await;
        self.inner.find_settled_settlement(key).await
    }

    async fn delete_settlements_for_trip(&self, trip_id: TripId) -> StoreResult<u64> {
        self.pause().await;
        self.inner.delete_settlements_for_trip(trip_id).await
    }
}

struct Fixture {
    ledger: TestLedger,
    notifier: Arc<RecordingNotifier>,
    u1: UserId,
    u2: UserId,
    outsider: UserId,
    trip: Trip,
}

async fn user(ledger: &TestLedger, name: &str) -> UserId {
    ledger
        .signup(SignupInput {
            email: format!("{name}@example.com"),
            name: name.to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap()
        .id
}

async fn fixture_with(notifier: RecordingNotifier) -> Fixture {
    let notifier = Arc::new(notifier);
    let ledger = Ledger::new(Arc::new(InMemoryLedgerStore::new()), Arc::clone(&notifier));
    let u1 = user(&ledger, "ana").await;
    let u2 = user(&ledger, "bo").await;
    let outsider = user(&ledger, "cy").await;
    let trip = ledger
        .create_trip(
            u1,
            CreateTripInput {
                name: "T1".to_string(),
                description: None,
                participant_ids: vec![u2],
            },
        )
        .await
        .unwrap();

    Fixture {
        ledger,
        notifier,
        u1,
        u2,
        outsider,
        trip,
    }
}

async fn fixture() -> Fixture {
    fixture_with(RecordingNotifier::new()).await
}

fn key(f: &Fixture, cents: i64) -> SettlementKey {
    SettlementKey {
        trip_id: f.trip.id,
        from_user_id: f.u2,
        to_user_id: f.u1,
        amount: Money::from_cents(cents),
    }
}

async fn hundred_split_equally(f: &Fixture) {
    f.ledger
        .create_expense(
            f.u1,
            CreateExpenseInput {
                trip_id: f.trip.id,
                description: "Hotel".to_string(),
                amount: Money::from_cents(10_000),
                paid_by: f.u1,
                participants: vec![f.u1, f.u2],
                split_kind: SplitKind::Equal,
                shares: None,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_remind_then_settle_then_settle_again() {
    let f = fixture().await;
    hundred_split_equally(&f).await;

    let reminded = f.ledger.remind(f.u1, key(&f, 5_000)).await.unwrap();
    assert!(reminded.created);
    assert!(reminded.warning.is_none());
    assert_eq!(reminded.settlement.status, SettlementStatus::Pending);

    let settled = f.ledger.settle(f.u2, key(&f, 5_000)).await.unwrap();
    assert_eq!(settled.transition, SettleTransition::Transitioned);
    assert_eq!(settled.settlement.id, reminded.settlement.id);
    assert_eq!(settled.settlement.status, SettlementStatus::Settled);
    assert_eq!(settled.expenses_marked, 1);

    let again = f.ledger.settle(f.u2, key(&f, 5_000)).await.unwrap();
    assert_eq!(again.transition, SettleTransition::AlreadySettled);
    assert_eq!(again.expenses_marked, 0);

    let records = f.ledger.list_settlements(f.trip.id, f.u1).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, SettlementStatus::Settled);

    let balances = f.ledger.net_balances(f.trip.id, f.u1).await.unwrap();
    assert!(balances.pairs.is_empty());

    let expenses = f.ledger.list_expenses(Some(f.trip.id), f.u1).await.unwrap();
    assert!(expenses[0].settled);
    assert!(expenses[0].settled_at.is_some());
}

#[tokio::test]
async fn test_repeated_remind_bumps_single_pending() {
    let f = fixture().await;

    let first = f.ledger.remind(f.u1, key(&f, 5_000)).await.unwrap();
    let second = f.ledger.remind(f.u2, key(&f, 5_000)).await.unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.settlement.id, second.settlement.id);
    assert!(second.settlement.reminded_at >= first.settlement.reminded_at);
    assert_eq!(f.ledger.list_settlements(f.trip.id, f.u1).await.unwrap().len(), 1);
    assert_eq!(f.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_remind_sends_to_debtor_with_creditor_bcc() {
    let f = fixture().await;
    f.ledger.remind(f.u1, key(&f, 5_000)).await.unwrap();

    let sent = f.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "bo@example.com");
    assert_eq!(sent[0].bcc.as_deref(), Some("ana@example.com"));
    assert_eq!(sent[0].subject, "Payment Request: Settle 50.00 with ana");
}

#[tokio::test]
async fn test_remind_delivery_failure_is_a_warning() {
    let f = fixture_with(RecordingNotifier::failing()).await;

    let outcome = f.ledger.remind(f.u1, key(&f, 5_000)).await.unwrap();

    assert!(outcome.warning.is_some());
    assert_eq!(f.ledger.list_settlements(f.trip.id, f.u1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_settle_without_pending_creates_settled_record() {
    let f = fixture().await;

    let outcome = f.ledger.settle(f.u1, key(&f, 2_500)).await.unwrap();

    assert_eq!(outcome.transition, SettleTransition::SettledDirectly);
    assert_eq!(outcome.settlement.status, SettlementStatus::Settled);
    assert!(outcome.settlement.reminded_at.is_none());
    assert_eq!(outcome.settlement.initiated_by, f.u1);
}

#[tokio::test]
async fn test_different_amount_is_a_new_instance() {
    let f = fixture().await;
    f.ledger.settle(f.u2, key(&f, 5_000)).await.unwrap();

    let other = f.ledger.settle(f.u2, key(&f, 1_000)).await.unwrap();
    assert_eq!(other.transition, SettleTransition::SettledDirectly);
    assert_eq!(f.ledger.list_settlements(f.trip.id, f.u2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_concurrent_settles_produce_one_record() {
    let f = fixture().await;

    let results = join_all((0..8).map(|_| f.ledger.settle(f.u2, key(&f, 5_000)))).await;

    let outcomes: Vec<_> = results.into_iter().map(Result::unwrap).collect();
    let changed = outcomes.iter().filter(|o| o.transition.changed()).count();
    assert_eq!(changed, 1);

    let records = f.ledger.list_settlements(f.trip.id, f.u1).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, SettlementStatus::Settled);
}

fn yielding(f: &Fixture, yields: usize) -> Ledger<YieldingStore, RecordingNotifier> {
    Ledger::new(
        Arc::new(YieldingStore {
            inner: Arc::clone(&f.ledger.store),
            yields,
        }),
        Arc::clone(&f.notifier),
    )
}

#[rstest]
#[tokio::test]
async fn test_staggered_settles_produce_one_record(
    #[values(1, 2, 3, 4)] first: usize,
    #[values(1, 2, 3, 4)] second: usize,
) {
    let f = fixture().await;
    let a = yielding(&f, first);
    let b = yielding(&f, second);
    let k = key(&f, 5_000);

    let (ra, rb) = futures::join!(a.settle(f.u2, k), b.settle(f.u1, k));

    let changed = [ra.unwrap(), rb.unwrap()]
        .iter()
        .filter(|o| o.transition.changed())
        .count();
    assert_eq!(changed, 1);

    let records = f.ledger.list_settlements(f.trip.id, f.u1).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, SettlementStatus::Settled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_spawned_settles_race_on_worker_threads() {
    let f = fixture().await;
    let k = key(&f, 7_500);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ledger = yielding(&f, i % 3 + 1);
            let caller = f.u1;
            tokio::spawn(async move { ledger.settle(caller, k).await })
        })
        .collect();

    let mut changed = 0;
    for handle in join_all(handles).await {
        if handle.unwrap().unwrap().transition.changed() {
            changed += 1;
        }
    }

    assert_eq!(changed, 1);
    assert_eq!(f.ledger.list_settlements(f.trip.id, f.u1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_settlement_validation() {
    let f = fixture().await;

    let self_debt = SettlementKey {
        to_user_id: f.u2,
        ..key(&f, 5_000)
    };
    assert!(matches!(
        f.ledger.settle(f.u2, self_debt).await,
        Err(LedgerError::SelfSettlement)
    ));

    assert!(matches!(
        f.ledger.remind(f.u1, key(&f, 0)).await,
        Err(LedgerError::InvalidInput(_))
    ));

    let outsider_debt = SettlementKey {
        from_user_id: f.outsider,
        ..key(&f, 5_000)
    };
    assert!(matches!(
        f.ledger.remind(f.u1, outsider_debt).await,
        Err(LedgerError::NotTripMember { .. })
    ));

    let unknown_trip = SettlementKey {
        trip_id: TripId::new(),
        ..key(&f, 5_000)
    };
    assert!(matches!(
        f.ledger.settle(f.u1, unknown_trip).await,
        Err(LedgerError::TripNotFound(_))
    ));

    assert!(f.notifier.sent().is_empty());
    assert!(f.ledger.list_settlements(f.trip.id, f.u1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_member_forbidden_everywhere() {
    let f = fixture().await;
    hundred_split_equally(&f).await;
    let expense_id = f.ledger.list_expenses(None, f.u1).await.unwrap()[0].id;
    let trip_id = f.trip.id;
    let x = f.outsider;

    let results = [
        f.ledger.get_trip(trip_id, x).await.map(|_| ()),
        f.ledger.list_expenses(Some(trip_id), x).await.map(|_| ()),
        f.ledger.delete_expense(expense_id, x).await,
        f.ledger.remind(x, key(&f, 5_000)).await.map(|_| ()),
        f.ledger.settle(x, key(&f, 5_000)).await.map(|_| ()),
        f.ledger.list_settlements(trip_id, x).await.map(|_| ()),
        f.ledger.net_balances(trip_id, x).await.map(|_| ()),
    ];

    for result in results {
        let err = result.unwrap_err();
        assert!(err.is_forbidden(), "expected forbidden, got {err:?}");
    }
}

#[tokio::test]
async fn test_three_way_scenario_balances() {
    let f = fixture().await;
    let u3 = user(&f.ledger, "dee").await;
    f.ledger
        .update_trip(
            f.trip.id,
            f.u1,
            crate::trip::TripPatch {
                participant_ids: Some(vec![f.u2, u3]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    f.ledger
        .create_expense(
            f.u1,
            CreateExpenseInput {
                trip_id: f.trip.id,
                description: "Taxi".to_string(),
                amount: Money::from_cents(10_000),
                paid_by: f.u1,
                participants: vec![f.u1, f.u2, u3],
                split_kind: SplitKind::Equal,
                shares: None,
            },
        )
        .await
        .unwrap();

    let balances = f.ledger.net_balances(f.trip.id, u3).await.unwrap();
    assert_eq!(balances.between(f.u1, f.u2), Money::from_cents(3_333));
    assert_eq!(balances.between(f.u1, u3), Money::from_cents(3_333));
    assert_eq!(balances.pairs.len(), 2);
}

#[tokio::test]
async fn test_delete_trip_cascades() {
    let f = fixture().await;
    hundred_split_equally(&f).await;
    f.ledger.remind(f.u1, key(&f, 5_000)).await.unwrap();

    let deletion = f.ledger.delete_trip(f.trip.id, f.u1).await.unwrap();
    assert_eq!(deletion.expenses_deleted, 1);
    assert_eq!(deletion.settlements_deleted, 1);

    assert!(f.ledger.list_expenses(None, f.u1).await.unwrap().is_empty());
    assert!(f.ledger.list_trips(f.u2).await.unwrap().is_empty());
    assert!(matches!(
        f.ledger.get_trip(f.trip.id, f.u1).await,
        Err(LedgerError::TripNotFound(_))
    ));
}
