use axum::routing::post;
use axum::Router;

use crate::handlers::callback;
use crate::state::AppState;

/// Completion webhook called by the execution service (root level).
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/callback/designautomation",
        post(callback::designautomation_callback),
    )
}
