//! API route definitions.

use axum::{Router, middleware};
use tripsplit_core::{LedgerStore, Notifier};

use crate::{AppState, middleware::auth_middleware};

pub mod auth;
pub mod expenses;
pub mod health;
pub mod settlements;
pub mod trips;
pub mod users;

/// Creates the router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn app_routes<S: LedgerStore, N: Notifier>(state: AppState<S, N>) -> Router<AppState<S, N>> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(trips::routes())
        .merge(expenses::routes())
        .merge(settlements::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S, N>,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
