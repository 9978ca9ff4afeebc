pub mod auth;
pub mod health;
pub mod plans;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/me                       current user (requires auth)
///
/// /plans                         history, oldest first
/// /plans/generate                generate one plan (POST)
/// /plans/{id}                    one plan
/// /plans/{id}/export             download as json / text / pdf
///
/// /usage                         quota usage for the current month
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/plans", plans::router())
        .route("/usage", get(handlers::usage::get_usage))
}
