//! In-process fakes for the orchestrator's collaborators.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use upgrader_automation::{
    ArtifactVersion, ContainerRef, Credentials, DataManagement, ExecutionService, RemoteError,
    WorkItemRequest, WorkItemSnapshot,
};
use upgrader_core::registry::WorkitemRegistry;
use upgrader_events::{NotificationSink, WorkitemEvent};
use upgrader_lifecycle::{CompletionCallback, UpgradeSettings, WorkitemOrchestrator};

pub const SUPPORTED_TYPE: &str = "versions:autodesk.bim360:C4RModel";

// ---------------------------------------------------------------------------
// Execution service
// ---------------------------------------------------------------------------

/// Assigns ids `wi-1`, `wi-2`, ... to submitted workitems.
#[derive(Default)]
pub struct FakeExecution {
    next_id: AtomicU32,
    pub submitted: Mutex<Vec<WorkItemRequest>>,
    pub cancelled: Mutex<Vec<String>>,
    /// Status code returned by `submit` instead of a snapshot.
    pub reject_submit: Mutex<Option<u16>>,
    /// Status code returned by `cancel` instead of success.
    pub reject_cancel: Mutex<Option<u16>>,
    /// Returned once by the next `submit`, ahead of `reject_submit`.
    pub fail_submit: Mutex<Option<RemoteError>>,
}

impl FakeExecution {
    pub fn rejecting_submit(status: u16) -> Self {
        let fake = Self::default();
        *fake.reject_submit.lock().unwrap() = Some(status);
        fake
    }

    pub fn failing_submit(error: RemoteError) -> Self {
        let fake = Self::default();
        *fake.fail_submit.lock().unwrap() = Some(error);
        fake
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }
}

fn rejected(status: u16) -> RemoteError {
    RemoteError::RemoteRejected {
        status,
        message: "rejected by fake".into(),
    }
}

#[async_trait]
impl ExecutionService for FakeExecution {
    async fn submit(&self, request: &WorkItemRequest) -> Result<WorkItemSnapshot, RemoteError> {
        if let Some(error) = self.fail_submit.lock().unwrap().take() {
            return Err(error);
        }
        if let Some(status) = *self.reject_submit.lock().unwrap() {
            return Err(rejected(status));
        }
        self.submitted.lock().unwrap().push(request.clone());
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(snapshot(&format!("wi-{n}"), "pending"))
    }

    async fn query(&self, workitem_id: &str) -> Result<WorkItemSnapshot, RemoteError> {
        if workitem_id == "wi-odd" {
            return Ok(snapshot(workitem_id, "quarantined"));
        }
        Ok(snapshot(workitem_id, "inprogress"))
    }

    async fn cancel(&self, workitem_id: &str) -> Result<(), RemoteError> {
        tokio::task::yield_now().await;
        if let Some(status) = *self.reject_cancel.lock().unwrap() {
            return Err(rejected(status));
        }
        self.cancelled.lock().unwrap().push(workitem_id.to_string());
        Ok(())
    }
}

/// A transport-level failure, as produced when a request never completes.
pub fn transport_error() -> RemoteError {
    let error = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    RemoteError::Transport(error)
}

pub fn snapshot(id: &str, status: &str) -> WorkItemSnapshot {
    WorkItemSnapshot {
        id: id.to_string(),
        status: status.to_string(),
        progress: None,
        report_url: None,
        extra: Default::default(),
    }
}

// ---------------------------------------------------------------------------
// Data management
// ---------------------------------------------------------------------------

pub struct FakeDataManagement {
    pub artifact: Option<ArtifactVersion>,
    pub container: Option<ContainerRef>,
}

impl FakeDataManagement {
    pub fn with_type(declared_type: &str) -> Self {
        Self {
            artifact: Some(ArtifactVersion {
                storage_reference: "urn:adsk.objects:os.object:bucket/model.rvt".into(),
                declared_type: declared_type.into(),
                display_name: "model.rvt".into(),
            }),
            container: Some(ContainerRef {
                id: "b.hub-guid".into(),
            }),
        }
    }
}

impl Default for FakeDataManagement {
    fn default() -> Self {
        Self::with_type(SUPPORTED_TYPE)
    }
}

#[async_trait]
impl DataManagement for FakeDataManagement {
    async fn resolve_latest_artifact(
        &self,
        _project_id: Option<&str>,
        _item_id: &str,
        _credentials: &Credentials,
    ) -> Result<Option<ArtifactVersion>, RemoteError> {
        Ok(self.artifact.clone())
    }

    async fn resolve_container_for_target(
        &self,
        _project_id: Option<&str>,
        _credentials: &Credentials,
    ) -> Result<Option<ContainerRef>, RemoteError> {
        Ok(self.container.clone())
    }
}

// ---------------------------------------------------------------------------
// Notification sink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<WorkitemEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<WorkitemEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, workitem_id: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.workitem_id == workitem_id)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: WorkitemEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub orchestrator: WorkitemOrchestrator,
    pub execution: Arc<FakeExecution>,
    pub registry: Arc<WorkitemRegistry>,
    pub sink: Arc<RecordingSink>,
}

pub fn harness() -> Harness {
    harness_with(FakeExecution::default(), FakeDataManagement::default())
}

pub fn harness_with(execution: FakeExecution, data: FakeDataManagement) -> Harness {
    let execution = Arc::new(execution);
    let registry = Arc::new(WorkitemRegistry::new());
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = WorkitemOrchestrator::new(
        Arc::clone(&execution) as Arc<dyn ExecutionService>,
        Arc::new(data),
        Arc::clone(&registry),
        Arc::clone(&sink) as Arc<dyn NotificationSink>,
        settings(),
    );
    Harness {
        orchestrator,
        execution,
        registry,
        sink,
    }
}

pub fn settings() -> UpgradeSettings {
    UpgradeSettings {
        activity_id: "nick.RCWMigratorAppActivity+dev".into(),
        callback_url: "https://upgrader.example.com/callback/designautomation".into(),
        supported_version_type: SUPPORTED_TYPE.into(),
    }
}

pub fn credentials() -> Credentials {
    Credentials::new("user-token")
}

pub fn callback(id: &str, status: &str) -> CompletionCallback {
    CompletionCallback {
        id: id.into(),
        status: status.into(),
        report_url: None,
        extra: Default::default(),
    }
}
