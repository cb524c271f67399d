//! Current user endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::{AppState, error::ApiResult, middleware::AuthUser};
use tripsplit_core::account::User;
use tripsplit_core::{LedgerStore, Notifier};

/// Creates the users router.
pub fn routes<S: LedgerStore, N: Notifier>() -> Router<AppState<S, N>> {
    Router::new().route("/api/users/me", get(me::<S, N>))
}

/// Response wrapping a single user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user.
    pub user: User,
}

/// GET /api/users/me - Profile of the token holder.
async fn me<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = state.ledger.current_user(auth.user_id()).await?;
    Ok(Json(UserResponse { user }))
}
