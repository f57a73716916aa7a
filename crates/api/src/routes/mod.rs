pub mod callback;
pub mod health;
pub mod upgrader;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::notifications;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                              notification observers (WebSocket)
///
/// /upgrader/files/{source}/folders/{target}        start upgrade (POST)
/// /upgrader/files/{workitem_id}                    remote status (GET), cancel (DELETE)
/// /upgrader/workitems                              tracked workitems (GET)
/// ```
///
/// `{source}` and `{target}` are percent-encoded data-management
/// references such as `projects%2Fb.123%2Fitems%2Furn...`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(notifications::observer_socket))
        .nest("/upgrader", upgrader::router())
}
