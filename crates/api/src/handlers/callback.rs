//! Completion webhook of the execution service.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use upgrader_lifecycle::CompletionCallback;

use crate::state::AppState;

/// POST /callback/designautomation
///
/// Answers `202 Accepted` for every body, whatever its content type; the
/// workitem is resolved on a background task. Unparseable bodies and
/// processing failures are only logged since the remote service ignores
/// the response.
pub async fn designautomation_callback(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let callback: CompletionCallback = match serde_json::from_slice(&body) {
        Ok(callback) => callback,
        Err(e) => {
            tracing::warn!(
                error = %e,
                body_len = body.len(),
                "Unparseable completion callback dropped",
            );
            return StatusCode::ACCEPTED;
        }
    };

    tracing::info!(
        workitem_id = %callback.id,
        status = %callback.status,
        "Completion callback received",
    );
    state.orchestrator.acknowledge_completion(callback);
    StatusCode::ACCEPTED
}
