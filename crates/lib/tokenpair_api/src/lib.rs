//! # tokenpair_api
//!
//! HTTP API library for tokenpair.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

use axum::Router;
use axum::routing::post;
use sqlx::PgPool;
use tokenpair_core::auth::AuthService;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::auth;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Login and refresh flows over the configured stores.
    pub service: AuthService,
}

/// Run embedded database migrations.
///
/// Delegates to `tokenpair_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    tokenpair_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Handlers read the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_REFRESH, post(auth::refresh_handler))
        .layer(cors)
        .with_state(state)
}
