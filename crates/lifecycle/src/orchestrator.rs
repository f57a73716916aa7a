//! The workitem state machine.
//!
//! A workitem is tracked from the moment the execution service accepts it
//! until its first terminal resolution. Cancellation and the completion
//! callback both end in [`WorkitemRegistry::remove`], so whichever path
//! reaches the registry first wins and the other becomes a no-op.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use upgrader_automation::{Credentials, DataManagement, ExecutionService, WorkItemSnapshot};
use upgrader_core::reference::ResourceRef;
use upgrader_core::registry::WorkitemRegistry;
use upgrader_core::types::WorkitemId;
use upgrader_core::workitem::{
    validate_workitem_id, CorrelationContext, WorkitemRecord, WorkitemStatus,
};
use upgrader_events::{NotificationSink, WorkitemEvent};

use crate::error::LifecycleError;
use crate::request::{build_upgrade_request, TargetParameters};
use crate::settings::UpgradeSettings;

/// Returned to the caller once a workitem is submitted and tracked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionAck {
    pub file_name: String,
    pub workitem_id: WorkitemId,
    /// Local status of the new record, always `Submitted`.
    pub status: WorkitemStatus,
    /// Status string reported by the execution service, e.g. `pending`.
    pub remote_status: String,
}

/// Body the execution service posts to the completion webhook.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionCallback {
    pub id: WorkitemId,
    pub status: String,
    #[serde(default)]
    pub report_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CompletionCallback {
    /// `success` completes the workitem; every other status fails it.
    pub fn outcome(&self) -> WorkitemStatus {
        if self.status.trim().eq_ignore_ascii_case("success") {
            WorkitemStatus::Succeeded
        } else {
            WorkitemStatus::Failed
        }
    }
}

/// Drives submission, cancellation and completion of upgrade workitems.
///
/// Cheap to clone; every collaborator is shared behind an `Arc`.
#[derive(Clone)]
pub struct WorkitemOrchestrator {
    execution: Arc<dyn ExecutionService>,
    data: Arc<dyn DataManagement>,
    registry: Arc<WorkitemRegistry>,
    sink: Arc<dyn NotificationSink>,
    settings: Arc<UpgradeSettings>,
}

impl WorkitemOrchestrator {
    pub fn new(
        execution: Arc<dyn ExecutionService>,
        data: Arc<dyn DataManagement>,
        registry: Arc<WorkitemRegistry>,
        sink: Arc<dyn NotificationSink>,
        settings: UpgradeSettings,
    ) -> Self {
        Self {
            execution,
            data,
            registry,
            sink,
            settings: Arc::new(settings),
        }
    }

    /// Submit an upgrade of the `source` item into the `target` folder.
    ///
    /// A record is inserted only after the execution service has accepted
    /// the workitem; any earlier failure leaves the registry untouched.
    pub async fn start(
        &self,
        source: &str,
        target: &str,
        credentials: &Credentials,
    ) -> Result<SubmissionAck, LifecycleError> {
        let source_ref = ResourceRef::item(source)?;
        let target_ref = ResourceRef::folder(target)?;

        let artifact = self
            .data
            .resolve_latest_artifact(source_ref.project_id.as_deref(), &source_ref.id, credentials)
            .await?
            .ok_or(LifecycleError::SourceNotFound)?;

        if artifact.declared_type != self.settings.supported_version_type {
            tracing::info!(
                source,
                declared_type = %artifact.declared_type,
                "Source model type is not supported",
            );
            return Err(LifecycleError::UnsupportedSourceType {
                declared: artifact.declared_type,
            });
        }

        let hub = self
            .data
            .resolve_container_for_target(target_ref.project_id.as_deref(), credentials)
            .await?
            .ok_or(LifecycleError::TargetNotFound)?;

        let target_params = TargetParameters::new(
            &hub.id,
            target_ref.project_id.as_deref().unwrap_or_default(),
            &target_ref.id,
            &artifact.display_name,
        );
        let request =
            build_upgrade_request(&self.settings, &artifact, &target_params, credentials);

        let snapshot = self.execution.submit(&request).await?;

        let record = WorkitemRecord::submitted(
            snapshot.id.clone(),
            CorrelationContext {
                source: source.to_string(),
                target: target.to_string(),
                display_name: artifact.display_name.clone(),
            },
        );
        if let Err(e) = self.registry.insert(record).await {
            tracing::error!(
                workitem_id = %snapshot.id,
                error = %e,
                "Execution service returned an id that is already tracked",
            );
            return Err(e.into());
        }

        tracing::info!(
            workitem_id = %snapshot.id,
            file_name = %artifact.display_name,
            remote_status = %snapshot.status,
            "Upgrade workitem tracked",
        );

        Ok(SubmissionAck {
            file_name: artifact.display_name,
            workitem_id: snapshot.id,
            status: WorkitemStatus::Submitted,
            remote_status: snapshot.status,
        })
    }

    /// Cancel a tracked workitem.
    ///
    /// The remote call runs without holding the registry lock. If the
    /// completion callback resolves the workitem in the meantime, the
    /// cancellation reports [`LifecycleError::NotFound`] and publishes
    /// nothing.
    pub async fn cancel(&self, workitem_id: &str) -> Result<(), LifecycleError> {
        validate_workitem_id(workitem_id)?;
        self.registry.get(workitem_id).await?;

        if let Err(e) = self.execution.cancel(workitem_id).await {
            tracing::warn!(workitem_id, error = %e, "Workitem cancellation failed");
            return Err(e.into());
        }

        let record = match self.registry.remove(workitem_id).await {
            Ok(record) => record,
            Err(_) => {
                tracing::info!(
                    workitem_id,
                    "Workitem resolved before cancellation completed",
                );
                return Err(LifecycleError::NotFound(workitem_id.to_string()));
            }
        };

        let record = record.transition(WorkitemStatus::Cancelled)?;
        tracing::info!(workitem_id, "Workitem cancelled");
        self.sink.publish(WorkitemEvent::new(
            record.id,
            record.status,
            record.context,
        ));
        Ok(())
    }

    /// Raw status snapshot from the execution service.
    ///
    /// Works for any id the service knows, tracked or not.
    pub async fn status(&self, workitem_id: &str) -> Result<WorkItemSnapshot, LifecycleError> {
        validate_workitem_id(workitem_id)?;
        let snapshot = self.execution.query(workitem_id).await?;
        tracing::debug!(
            workitem_id,
            remote_status = %snapshot.status,
            status = %snapshot.lifecycle_status(),
            "Workitem status queried",
        );
        Ok(snapshot)
    }

    /// The tracked record for `workitem_id`.
    pub async fn get(&self, workitem_id: &str) -> Result<WorkitemRecord, LifecycleError> {
        Ok(self.registry.get(workitem_id).await?)
    }

    /// Every tracked record, oldest first.
    pub async fn list(&self) -> Vec<WorkitemRecord> {
        self.registry.list_all().await
    }

    /// Accept a completion callback and process it in the background.
    ///
    /// Returns as soon as the task is spawned so the webhook can answer
    /// before any registry or notification work happens.
    pub fn acknowledge_completion(
        &self,
        callback: CompletionCallback,
    ) -> JoinHandle<Option<WorkitemEvent>> {
        let orchestrator = self.clone();
        tokio::spawn(async move { orchestrator.resolve_completion(callback).await })
    }

    /// Resolve a workitem from its completion callback.
    ///
    /// Callbacks for untracked ids (already cancelled, or redelivered) are
    /// logged and dropped. Returns the published event, if any.
    pub async fn resolve_completion(&self, callback: CompletionCallback) -> Option<WorkitemEvent> {
        let outcome = callback.outcome();

        let record = match self.registry.remove(&callback.id).await {
            Ok(record) => record,
            Err(_) => {
                tracing::info!(
                    workitem_id = %callback.id,
                    status = %callback.status,
                    "Completion callback for untracked workitem dropped",
                );
                return None;
            }
        };

        let record = match record.transition(outcome) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(workitem_id = %callback.id, error = %e, "Invalid completion");
                return None;
            }
        };

        match outcome {
            WorkitemStatus::Succeeded => {
                tracing::info!(workitem_id = %record.id, "Workitem completed");
            }
            _ => {
                tracing::warn!(
                    workitem_id = %record.id,
                    status = %callback.status,
                    report_url = ?callback.report_url,
                    "Workitem failed",
                );
            }
        }

        let event = WorkitemEvent::new(record.id, record.status, record.context);
        self.sink.publish(event.clone());
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn callback_outcome_mapping() {
        let callback = |status: &str| CompletionCallback {
            id: "wi-1".into(),
            status: status.into(),
            report_url: None,
            extra: Default::default(),
        };
        assert_eq!(callback("success").outcome(), WorkitemStatus::Succeeded);
        assert_eq!(callback("failedInstructions").outcome(), WorkitemStatus::Failed);
        assert_eq!(callback("cancelled").outcome(), WorkitemStatus::Failed);
        assert_eq!(callback("").outcome(), WorkitemStatus::Failed);
    }

    #[test]
    fn callback_body_deserializes() {
        let callback: CompletionCallback = serde_json::from_value(json!({
            "id": "wi-1",
            "status": "success",
            "reportUrl": "https://reports/wi-1.txt",
            "stats": {"timeFinished": "2024-01-01T00:00:00Z"}
        }))
        .unwrap();

        assert_eq!(callback.id, "wi-1");
        assert_eq!(callback.report_url.as_deref(), Some("https://reports/wi-1.txt"));
        assert!(callback.extra.contains_key("stats"));
    }
}
