//! Request and response shapes of the workitem endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use upgrader_core::workitem::WorkitemStatus;

/// Argument slot receiving the model to upgrade.
pub const ARG_INPUT_FILE: &str = "rvtFile";

/// Argument slot receiving the JSON target parameters.
pub const ARG_INPUT_PARAMS: &str = "inputParams";

/// Argument slot receiving the completion callback target.
pub const ARG_ON_COMPLETE: &str = "onComplete";

/// Argument slot carrying the user token for the plugin's own cloud calls.
pub const ARG_USER_TOKEN: &str = "adsk3LeggedToken";

/// Prefix of the `data:` URLs produced by [`ArgumentBinding::data_json`].
pub const DATA_JSON_PREFIX: &str = "data:application/json,";

/// HTTP verb the remote service uses when fetching or posting an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
}

/// Value bound to one named argument slot of a workitem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentBinding {
    /// A URL the remote service fetches from (or posts to), with headers.
    Remote {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        verb: Option<Verb>,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
    },
    /// An inline value handed to the activity as-is.
    Inline(String),
}

impl ArgumentBinding {
    /// A plain URL with no verb or headers.
    pub fn url(url: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            verb: None,
            headers: BTreeMap::new(),
        }
    }

    /// A URL fetched with an `Authorization` header.
    pub fn authorized(url: impl Into<String>, authorization: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), authorization.into());
        Self::Remote {
            url: url.into(),
            verb: None,
            headers,
        }
    }

    /// A URL the remote service posts to when the workitem finishes.
    pub fn callback(url: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            verb: Some(Verb::Post),
            headers: BTreeMap::new(),
        }
    }

    /// Embed a JSON document as a `data:` URL. The payload is the compact
    /// serialized document, so any string value round-trips intact.
    pub fn data_json(value: &serde_json::Value) -> Self {
        Self::url(format!("{DATA_JSON_PREFIX}{value}"))
    }

    pub fn inline(value: impl Into<String>) -> Self {
        Self::Inline(value.into())
    }
}

/// Body of `POST /workitems`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemRequest {
    /// Fully qualified activity, `<nickname>.<activity>+<alias>`.
    pub activity_id: String,
    pub arguments: BTreeMap<String, ArgumentBinding>,
}

impl WorkItemRequest {
    pub fn new(activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            arguments: BTreeMap::new(),
        }
    }

    /// Bind `binding` to the slot `name`, replacing any previous binding.
    pub fn argument(mut self, name: impl Into<String>, binding: ArgumentBinding) -> Self {
        self.arguments.insert(name.into(), binding);
        self
    }
}

/// Status snapshot returned by the workitem endpoints.
///
/// Fields the upgrader does not interpret are preserved in `extra` so the
/// snapshot can be relayed to callers unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemSnapshot {
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WorkItemSnapshot {
    /// The remote status collapsed into the local lifecycle vocabulary.
    pub fn lifecycle_status(&self) -> WorkitemStatus {
        WorkitemStatus::from_remote(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_serializes_bindings() {
        let request = WorkItemRequest::new("nick.Activity+dev")
            .argument(ARG_INPUT_FILE, ArgumentBinding::authorized("urn:storage", "Bearer u"))
            .argument(ARG_ON_COMPLETE, ArgumentBinding::callback("https://host/callback"))
            .argument(ARG_USER_TOKEN, ArgumentBinding::inline("u"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["activityId"], "nick.Activity+dev");
        assert_eq!(value["arguments"]["rvtFile"]["url"], "urn:storage");
        assert_eq!(value["arguments"]["rvtFile"]["headers"]["Authorization"], "Bearer u");
        assert!(value["arguments"]["rvtFile"].get("verb").is_none());
        assert_eq!(value["arguments"]["onComplete"]["verb"], "post");
        assert_eq!(value["arguments"]["adsk3LeggedToken"], "u");
    }

    #[test]
    fn data_json_embeds_compact_json() {
        let binding = ArgumentBinding::data_json(&json!({"TargetModelName": "a.rvt"}));
        assert_eq!(
            binding,
            ArgumentBinding::url(r#"data:application/json,{"TargetModelName":"a.rvt"}"#)
        );
    }

    #[test]
    fn data_json_keeps_apostrophes_parseable() {
        let ArgumentBinding::Remote { url, .. } =
            ArgumentBinding::data_json(&json!({"TargetModelName": "O'Brien.rvt"}))
        else {
            panic!("data_json should produce a URL binding");
        };
        let payload: serde_json::Value =
            serde_json::from_str(url.strip_prefix(DATA_JSON_PREFIX).unwrap()).unwrap();
        assert_eq!(payload["TargetModelName"], "O'Brien.rvt");
    }

    #[test]
    fn snapshot_keeps_unknown_fields() {
        let snapshot: WorkItemSnapshot = serde_json::from_value(json!({
            "id": "wi-1",
            "status": "inprogress",
            "progress": "50%",
            "stats": {"timeQueued": "2024-01-01T00:00:00Z"}
        }))
        .unwrap();

        assert_eq!(snapshot.lifecycle_status(), WorkitemStatus::Running);
        assert_eq!(snapshot.progress.as_deref(), Some("50%"));
        assert!(snapshot.extra.contains_key("stats"));

        let back = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(back["stats"]["timeQueued"], "2024-01-01T00:00:00Z");
    }
}
