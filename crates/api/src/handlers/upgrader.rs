//! Handlers for the `/upgrader` resource.
//!
//! Every route requires the caller's bearer token. Starting an upgrade
//! forwards it to the data-management service and to the conversion
//! plugin; status, cancel and listing only check that it is present and
//! call the execution service with the service token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use upgrader_automation::WorkItemSnapshot;
use upgrader_core::workitem::WorkitemRecord;

use crate::error::AppResult;
use crate::middleware::auth::UserCredentials;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body returned when an upgrade is accepted.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResponse {
    pub file_name: String,
    pub work_item_id: String,
    /// Status as reported by the execution service, e.g. `pending`.
    pub work_item_status: String,
}

/// POST /api/v1/upgrader/files/{source}/folders/{target}
pub async fn start_upgrade(
    State(state): State<AppState>,
    UserCredentials(credentials): UserCredentials,
    Path((source, target)): Path<(String, String)>,
) -> AppResult<Json<UpgradeResponse>> {
    let ack = state
        .orchestrator
        .start(&source, &target, &credentials)
        .await?;

    Ok(Json(UpgradeResponse {
        file_name: ack.file_name,
        work_item_id: ack.workitem_id,
        work_item_status: ack.remote_status,
    }))
}

/// DELETE /api/v1/upgrader/files/{workitem_id}
///
/// Best-effort: the workitem may still complete if it was already running.
pub async fn cancel_upgrade(
    State(state): State<AppState>,
    UserCredentials(_): UserCredentials,
    Path(workitem_id): Path<String>,
) -> AppResult<StatusCode> {
    state.orchestrator.cancel(&workitem_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/upgrader/files/{workitem_id}
///
/// Relays the execution service's status snapshot unchanged.
pub async fn get_status(
    State(state): State<AppState>,
    UserCredentials(_): UserCredentials,
    Path(workitem_id): Path<String>,
) -> AppResult<Json<WorkItemSnapshot>> {
    let snapshot = state.orchestrator.status(&workitem_id).await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/upgrader/workitems
pub async fn list_workitems(
    State(state): State<AppState>,
    UserCredentials(_): UserCredentials,
) -> AppResult<Json<DataResponse<Vec<WorkitemRecord>>>> {
    let records = state.orchestrator.list().await;
    Ok(Json(DataResponse { data: records }))
}
