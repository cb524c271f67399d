//! Signup and login.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tracing::info;

use crate::{AppState, error::ApiResult, extract::ApiJson};
use tripsplit_core::account::{SignupInput, User};
use tripsplit_core::{LedgerStore, Notifier};
use tripsplit_shared::auth::{AuthResponse, LoginRequest, SignupRequest};

/// Creates the auth router.
pub fn routes<S: LedgerStore, N: Notifier>() -> Router<AppState<S, N>> {
    Router::new()
        .route("/signup", post(signup::<S, N>))
        .route("/login", post(login::<S, N>))
}

fn auth_response<S, N>(
    state: &AppState<S, N>,
    user: User,
    message: &str,
) -> ApiResult<AuthResponse> {
    let token = state.jwt_service.issue(user.id, &user.email)?;
    Ok(AuthResponse {
        message: message.to_string(),
        user: user.into(),
        token,
        expires_in: state.jwt_service.expires_in(),
    })
}

/// POST /signup - Register a new user and return a token.
async fn signup<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = state
        .ledger
        .signup(SignupInput {
            email: payload.email,
            name: payload.name,
            password: payload.password,
        })
        .await?;

    info!(user_id = %user.id, "User signed up");
    let response = auth_response(&state, user, "User created")?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /login - Authenticate a user and return a token.
async fn login<S: LedgerStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .ledger
        .login(&payload.email, &payload.password)
        .await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(auth_response(&state, user, "Login successful")?))
}
