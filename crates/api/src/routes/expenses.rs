//! Expense routes.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};
use tripsplit_core::expense::{CreateExpenseInput, Expense, ExpensePatch};
use tripsplit_core::split::SplitKind;
use tripsplit_core::{LedgerStore, Notifier};
use tripsplit_shared::types::{ExpenseId, Money, TripId, UserId};

/// Creates the expense routes.
pub fn routes<S: LedgerStore, N: Notifier>() -> Router<AppState<S, N>> {
    Router::new()
        .route(
            "/api/expenses",
            get(list_expenses::<S, N>).post(create_expense::<S, N>),
        )
        .route(
            "/api/expenses/{expense_id}",
            patch(update_expense::<S, N>).delete(delete_expense::<S, N>),
        )
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpensesQuery {
    /// Restrict to one trip. Otherwise every trip of the caller.
    pub trip_id: Option<TripId>,
}

/// Request body for creating an expense.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    /// Trip the expense belongs to.
    pub trip_id: TripId,
    /// What was paid for.
    pub description: String,
    /// Total amount.
    pub amount: Money,
    /// Member who paid.
    pub paid_by: UserId,
    /// Members sharing the cost.
    #[serde(default)]
    pub participants: Vec<UserId>,
    /// `equal` (default) or `unequal`.
    #[serde(default)]
    pub split_type: SplitKind,
    /// Amount owed per user, unequal splits only.
    pub shares: Option<BTreeMap<UserId, Money>>,
}

/// Request body for updating an expense. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Money>,
    /// New payer.
    pub paid_by: Option<UserId>,
    /// Replacement participants.
    pub participants: Option<Vec<UserId>>,
    /// New split rule.
    pub split_type: Option<SplitKind>,
    /// Replacement shares.
    pub shares: Option<BTreeMap<UserId, Money>>,
}

/// Response wrapping a list of expenses.
#[derive(Debug, Serialize)]
pub struct ExpensesResponse {
    /// Expenses.
    pub expenses: Vec<Expense>,
}

/// Response wrapping a single expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Outcome message, omitted on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// The expense.
    pub expense: Expense,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Outcome message.
    pub message: &'static str,
}

/// GET /api/expenses?tripId= - Expenses of one trip or of every trip of the caller.
async fn list_expenses<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListExpensesQuery>,
) -> ApiResult<Json<ExpensesResponse>> {
    let expenses = state
        .ledger
        .list_expenses(query.trip_id, auth.user_id())
        .await?;
    Ok(Json(ExpensesResponse { expenses }))
}

/// POST /api/expenses - Record an expense.
async fn create_expense<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateExpenseRequest>,
) -> ApiResult<(StatusCode, Json<ExpenseResponse>)> {
    let input = CreateExpenseInput {
        trip_id: payload.trip_id,
        description: payload.description,
        amount: payload.amount,
        paid_by: payload.paid_by,
        participants: payload.participants,
        split_kind: payload.split_type,
        shares: payload.shares,
    };
    let expense = state.ledger.create_expense(auth.user_id(), input).await?;

    info!(
        expense_id = %expense.id,
        trip_id = %expense.trip_id,
        amount = %expense.amount,
        "Expense created"
    );
    Ok((
        StatusCode::CREATED,
        Json(ExpenseResponse {
            message: None,
            expense,
        }),
    ))
}

/// PATCH /api/expenses/{expense_id} - Update an expense and re-validate its split.
async fn update_expense<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiPath(expense_id): ApiPath<ExpenseId>,
    ApiJson(payload): ApiJson<UpdateExpenseRequest>,
) -> ApiResult<Json<ExpenseResponse>> {
    let patch = ExpensePatch {
        description: payload.description,
        amount: payload.amount,
        paid_by: payload.paid_by,
        participants: payload.participants,
        split_kind: payload.split_type,
        shares: payload.shares,
    };
    let expense = state
        .ledger
        .update_expense(expense_id, auth.user_id(), patch)
        .await?;

    info!(expense_id = %expense.id, "Expense updated");
    Ok(Json(ExpenseResponse {
        message: Some("Expense updated"),
        expense,
    }))
}

/// DELETE /api/expenses/{expense_id} - Delete an expense.
async fn delete_expense<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiPath(expense_id): ApiPath<ExpenseId>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .ledger
        .delete_expense(expense_id, auth.user_id())
        .await?;

    info!(expense_id = %expense_id, "Expense deleted");
    Ok(Json(MessageResponse {
        message: "Expense deleted",
    }))
}
