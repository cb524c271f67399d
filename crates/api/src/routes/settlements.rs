//! Settlement routes: listing, reminders and settling debts.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    AppState,
    error::ApiResult,
    extract::{ApiJson, ApiQuery},
    middleware::AuthUser,
};
use tripsplit_core::settlement::{RemindOutcome, SettleOutcome, Settlement, SettlementKey};
use tripsplit_core::{LedgerStore, Notifier};
use tripsplit_shared::types::{Money, TripId, UserId};

/// Creates the settlement routes.
pub fn routes<S: LedgerStore, N: Notifier>() -> Router<AppState<S, N>> {
    Router::new()
        .route("/api/settlements", get(list_settlements::<S, N>))
        .route("/settlements/remind", post(remind::<S, N>))
        .route("/settlements/settle", post(settle::<S, N>))
}

/// Query parameters for listing settlements.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSettlementsQuery {
    /// Trip whose records are listed.
    pub trip_id: TripId,
}

/// Identifies one debt: who owes whom how much within a trip.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRequest {
    /// Trip the debt belongs to.
    pub trip_id: TripId,
    /// Debtor.
    pub from_user_id: UserId,
    /// Creditor.
    pub to_user_id: UserId,
    /// Amount owed.
    pub amount: Money,
}

impl From<SettlementRequest> for SettlementKey {
    fn from(req: SettlementRequest) -> Self {
        Self {
            trip_id: req.trip_id,
            from_user_id: req.from_user_id,
            to_user_id: req.to_user_id,
            amount: req.amount,
        }
    }
}

/// Response wrapping settlement records.
#[derive(Debug, Serialize)]
pub struct SettlementsResponse {
    /// Records, oldest first.
    pub settlements: Vec<Settlement>,
}

/// Response for a reminder.
#[derive(Debug, Serialize)]
pub struct RemindResponse {
    /// Outcome message.
    pub message: &'static str,
    /// Reminder details.
    #[serde(flatten)]
    pub outcome: RemindOutcome,
}

/// Response for a settle call.
#[derive(Debug, Serialize)]
pub struct SettleResponse {
    /// Outcome message.
    pub message: &'static str,
    /// Settle details.
    #[serde(flatten)]
    pub outcome: SettleOutcome,
}

/// GET /api/settlements?tripId= - Settlement records of a trip.
async fn list_settlements<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListSettlementsQuery>,
) -> ApiResult<Json<SettlementsResponse>> {
    let settlements = state
        .ledger
        .list_settlements(query.trip_id, auth.user_id())
        .await?;
    Ok(Json(SettlementsResponse { settlements }))
}

/// POST /settlements/remind - Record a pending debt and email the debtor.
async fn remind<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<SettlementRequest>,
) -> ApiResult<Json<RemindResponse>> {
    let outcome = state.ledger.remind(auth.user_id(), payload.into()).await?;

    let message = if let Some(warning) = &outcome.warning {
        warn!(settlement_id = %outcome.settlement.id, warning = %warning, "Reminder recorded without email");
        "Settlement recorded, but the reminder email could not be sent"
    } else {
        info!(settlement_id = %outcome.settlement.id, created = outcome.created, "Reminder sent");
        "Reminder sent and settlement recorded"
    };

    Ok(Json(RemindResponse { message, outcome }))
}

/// POST /settlements/settle - Mark a debt as paid.
async fn settle<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<SettlementRequest>,
) -> ApiResult<Json<SettleResponse>> {
    let outcome = state.ledger.settle(auth.user_id(), payload.into()).await?;

    let message = if outcome.transition.changed() {
        info!(
            settlement_id = %outcome.settlement.id,
            expenses_marked = outcome.expenses_marked,
            "Settlement completed"
        );
        "Settlement completed"
    } else {
        "Settlement already completed"
    };

    Ok(Json(SettleResponse { message, outcome }))
}
