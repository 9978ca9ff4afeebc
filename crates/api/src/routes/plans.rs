//! Route definitions for the `/plans` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::plans;
use crate::state::AppState;

/// Routes mounted at `/plans`. All require auth.
///
/// ```text
/// POST /generate      -> generate
/// GET  /              -> list
/// GET  /{id}          -> get_by_id
/// GET  /{id}/export   -> export (?format=json|text|pdf)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(plans::generate))
        .route("/", get(plans::list))
        .route("/{id}", get(plans::get_by_id))
        .route("/{id}/export", get(plans::export))
}
