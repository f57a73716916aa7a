use axum::routing::{get, post};
use axum::Router;

use crate::handlers::upgrader;
use crate::state::AppState;

/// Routes mounted at `/api/v1/upgrader`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/files/{source}/folders/{target}",
            post(upgrader::start_upgrade),
        )
        .route(
            "/files/{workitem_id}",
            get(upgrader::get_status).delete(upgrader::cancel_upgrade),
        )
        .route("/workitems", get(upgrader::list_workitems))
}
