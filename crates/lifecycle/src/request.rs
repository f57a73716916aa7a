//! Construction of the upgrade workitem submitted to the execution service.

use serde::Serialize;
use upgrader_automation::workitem::{
    ARG_INPUT_FILE, ARG_INPUT_PARAMS, ARG_ON_COMPLETE, ARG_USER_TOKEN,
};
use upgrader_automation::{ArgumentBinding, ArtifactVersion, Credentials, WorkItemRequest};
use upgrader_core::reference::strip_id_prefix;

use crate::settings::UpgradeSettings;

/// Where the upgraded model is written, as read by the conversion plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TargetParameters {
    pub target_account_guid: String,
    pub target_project_guid: String,
    pub target_folder_urn: String,
    pub target_model_name: String,
}

impl TargetParameters {
    /// `hub_id` and `project_id` are data-management ids (`b.<guid>`).
    pub fn new(hub_id: &str, project_id: &str, folder_id: &str, model_name: &str) -> Self {
        Self {
            target_account_guid: strip_id_prefix(hub_id).to_string(),
            target_project_guid: strip_id_prefix(project_id).to_string(),
            target_folder_urn: folder_id.to_string(),
            target_model_name: model_name.to_string(),
        }
    }
}

/// Bind every argument slot of the upgrade activity.
pub fn build_upgrade_request(
    settings: &UpgradeSettings,
    artifact: &ArtifactVersion,
    target: &TargetParameters,
    credentials: &Credentials,
) -> WorkItemRequest {
    let params = serde_json::json!({
        "TargetAccountGuid": target.target_account_guid,
        "TargetProjectGuid": target.target_project_guid,
        "TargetFolderUrn": target.target_folder_urn,
        "TargetModelName": target.target_model_name,
    });

    WorkItemRequest::new(settings.activity_id.clone())
        .argument(
            ARG_INPUT_FILE,
            ArgumentBinding::authorized(artifact.storage_reference.clone(), credentials.bearer()),
        )
        .argument(ARG_INPUT_PARAMS, ArgumentBinding::data_json(&params))
        .argument(ARG_ON_COMPLETE, ArgumentBinding::callback(settings.callback_url.clone()))
        .argument(
            ARG_USER_TOKEN,
            ArgumentBinding::inline(credentials.access_token.clone()),
        )
}
