//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes over the trip ledger
//! - Bearer authentication middleware
//! - JSON error rendering
//! - The SMTP-backed notifier

pub mod error;
pub mod extract;
pub mod middleware;
pub mod notifier;
pub mod routes;


use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tripsplit_core::{Ledger, LedgerStore, Notifier};
use tripsplit_shared::JwtService;

pub use error::{ApiError, ApiResult};
pub use notifier::EmailNotifier;

/// Application state shared across handlers.
pub struct AppState<S, N> {
    /// Trip ledger.
    pub ledger: Ledger<S, N>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl<S, N> AppState<S, N> {
    /// Creates the state from a ledger and a token service.
    #[must_use]
    pub fn new(ledger: Ledger<S, N>, jwt_service: JwtService) -> Self {
        Self {
            ledger,
            jwt_service: Arc::new(jwt_service),
        }
    }
}

impl<S, N> Clone for AppState<S, N> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            jwt_service: Arc::clone(&self.jwt_service),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: LedgerStore, N: Notifier>(state: AppState<S, N>) -> Router {
    routes::app_routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
