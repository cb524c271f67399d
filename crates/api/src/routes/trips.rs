//! Trip management routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::{
    AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    middleware::AuthUser,
};
use tripsplit_core::balance::{Debt, PairBalance};
use tripsplit_core::trip::{CreateTripInput, Trip, TripPatch};
use tripsplit_core::{LedgerStore, Notifier};
use tripsplit_shared::types::{TripId, UserId};

/// Creates the trip routes.
pub fn routes<S: LedgerStore, N: Notifier>() -> Router<AppState<S, N>> {
    Router::new()
        .route(
            "/api/trips",
            get(list_trips::<S, N>).post(create_trip::<S, N>),
        )
        .route(
            "/api/trips/{trip_id}",
            get(get_trip::<S, N>)
                .patch(update_trip::<S, N>)
                .post(update_trip::<S, N>)
                .delete(delete_trip::<S, N>),
        )
        .route("/api/trips/{trip_id}/balances", get(get_balances::<S, N>))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a trip.
#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    /// Trip name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Participant user IDs. The caller is added as owner.
    #[serde(default)]
    pub participants: Vec<UserId>,
}

/// Request body for updating a trip. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateTripRequest {
    /// New name.
    pub name: Option<String>,
    /// New description, `null` clears it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// Replacement participant list.
    pub participants: Option<Vec<UserId>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Response wrapping a list of trips.
#[derive(Debug, Serialize)]
pub struct TripsResponse {
    /// Trips visible to the caller.
    pub trips: Vec<Trip>,
}

/// Response wrapping a single trip.
#[derive(Debug, Serialize)]
pub struct TripResponse {
    /// Outcome message, omitted on reads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// The trip.
    pub trip: Trip,
}

/// Response for a deleted trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTripResponse {
    /// Outcome message.
    pub message: &'static str,
    /// Expenses removed with the trip.
    pub expenses_deleted: u64,
    /// Settlement records removed with the trip.
    pub settlements_deleted: u64,
}

/// Net balances of a trip.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    /// Trip ID.
    pub trip_id: TripId,
    /// Signed pairwise balances.
    pub balances: Vec<PairBalance>,
    /// The same balances as directed debts.
    pub debts: Vec<Debt>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/trips - Trips the caller owns or participates in.
async fn list_trips<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
) -> ApiResult<Json<TripsResponse>> {
    let trips = state.ledger.list_trips(auth.user_id()).await?;
    Ok(Json(TripsResponse { trips }))
}

/// POST /api/trips - Create a trip owned by the caller.
async fn create_trip<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateTripRequest>,
) -> ApiResult<(StatusCode, Json<TripResponse>)> {
    let trip = state
        .ledger
        .create_trip(
            auth.user_id(),
            CreateTripInput {
                name: payload.name,
                description: payload.description,
                participant_ids: payload.participants,
            },
        )
        .await?;

    info!(trip_id = %trip.id, owner_id = %trip.owner_id, "Trip created");
    Ok((
        StatusCode::CREATED,
        Json(TripResponse {
            message: None,
            trip,
        }),
    ))
}

/// GET /api/trips/{trip_id} - Read a trip.
async fn get_trip<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiPath(trip_id): ApiPath<TripId>,
) -> ApiResult<Json<TripResponse>> {
    let trip = state.ledger.get_trip(trip_id, auth.user_id()).await?;
    Ok(Json(TripResponse {
        message: None,
        trip,
    }))
}

/// PATCH|POST /api/trips/{trip_id} - Update a trip. Owner only.
async fn update_trip<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiPath(trip_id): ApiPath<TripId>,
    ApiJson(payload): ApiJson<UpdateTripRequest>,
) -> ApiResult<Json<TripResponse>> {
    let patch = TripPatch {
        name: payload.name,
        description: payload.description,
        participant_ids: payload.participants,
    };
    let trip = state
        .ledger
        .update_trip(trip_id, auth.user_id(), patch)
        .await?;

    info!(trip_id = %trip.id, "Trip updated");
    Ok(Json(TripResponse {
        message: Some("Trip updated"),
        trip,
    }))
}

/// DELETE /api/trips/{trip_id} - Delete a trip with its expenses. Owner only.
async fn delete_trip<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiPath(trip_id): ApiPath<TripId>,
) -> ApiResult<Json<DeleteTripResponse>> {
    let deletion = state.ledger.delete_trip(trip_id, auth.user_id()).await?;

    info!(
        trip_id = %trip_id,
        expenses_deleted = deletion.expenses_deleted,
        settlements_deleted = deletion.settlements_deleted,
        "Trip deleted"
    );
    Ok(Json(DeleteTripResponse {
        message: "Trip deleted",
        expenses_deleted: deletion.expenses_deleted,
        settlements_deleted: deletion.settlements_deleted,
    }))
}

/// GET /api/trips/{trip_id}/balances - Net pairwise balances.
async fn get_balances<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
    ApiPath(trip_id): ApiPath<TripId>,
) -> ApiResult<Json<BalancesResponse>> {
    let balances = state.ledger.net_balances(trip_id, auth.user_id()).await?;
    Ok(Json(BalancesResponse {
        trip_id: balances.trip_id,
        debts: balances.debts(),
        balances: balances.pairs,
    }))
}
