#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use upgrader_api::config::ServerConfig;
use upgrader_api::router::build_app_router;
use upgrader_api::state::AppState;
use upgrader_api::notifications::ObserverRegistry;
use upgrader_automation::{
    ArtifactVersion, ContainerRef, Credentials, DataManagement, ExecutionService, RemoteError,
    WorkItemRequest, WorkItemSnapshot,
};
use upgrader_core::registry::WorkitemRegistry;
use upgrader_events::{EventBus, NotificationSink};
use upgrader_lifecycle::{UpgradeSettings, WorkitemOrchestrator};

pub const SUPPORTED_TYPE: &str = "versions:autodesk.bim360:C4RModel";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        stale_workitem_secs: 7200,
        observer_heartbeat_secs: 30,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Execution service assigning ids `wi-1`, `wi-2`, ...
#[derive(Default)]
pub struct FakeExecution {
    next_id: AtomicU32,
    pub reject_submit: Mutex<Option<u16>>,
    pub reject_cancel: Mutex<Option<u16>>,
    pub cancelled: Mutex<Vec<String>>,
}

fn rejected(status: u16) -> RemoteError {
    RemoteError::RemoteRejected {
        status,
        message: "rejected by fake".into(),
    }
}

#[async_trait]
impl ExecutionService for FakeExecution {
    async fn submit(&self, _request: &WorkItemRequest) -> Result<WorkItemSnapshot, RemoteError> {
        if let Some(status) = *self.reject_submit.lock().unwrap() {
            return Err(rejected(status));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(snapshot(&format!("wi-{n}"), "pending"))
    }

    async fn query(&self, workitem_id: &str) -> Result<WorkItemSnapshot, RemoteError> {
        if workitem_id == "wi-unknown" {
            return Err(rejected(404));
        }
        let mut snapshot = snapshot(workitem_id, "inprogress");
        snapshot.progress = Some("50%".into());
        Ok(snapshot)
    }

    async fn cancel(&self, workitem_id: &str) -> Result<(), RemoteError> {
        if let Some(status) = *self.reject_cancel.lock().unwrap() {
            return Err(rejected(status));
        }
        self.cancelled.lock().unwrap().push(workitem_id.to_string());
        Ok(())
    }
}

fn snapshot(id: &str, status: &str) -> WorkItemSnapshot {
    WorkItemSnapshot {
        id: id.to_string(),
        status: status.to_string(),
        progress: None,
        report_url: None,
        extra: Default::default(),
    }
}

pub struct FakeDataManagement {
    pub declared_type: String,
}

impl Default for FakeDataManagement {
    fn default() -> Self {
        Self {
            declared_type: SUPPORTED_TYPE.into(),
        }
    }
}

#[async_trait]
impl DataManagement for FakeDataManagement {
    async fn resolve_latest_artifact(
        &self,
        _project_id: Option<&str>,
        item_id: &str,
        _credentials: &Credentials,
    ) -> Result<Option<ArtifactVersion>, RemoteError> {
        if item_id == "missing" {
            return Ok(None);
        }
        Ok(Some(ArtifactVersion {
            storage_reference: format!("urn:storage:{item_id}"),
            declared_type: self.declared_type.clone(),
            display_name: "model.rvt".into(),
        }))
    }

    async fn resolve_container_for_target(
        &self,
        _project_id: Option<&str>,
        _credentials: &Credentials,
    ) -> Result<Option<ContainerRef>, RemoteError> {
        Ok(Some(ContainerRef {
            id: "b.hub-guid".into(),
        }))
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub execution: Arc<FakeExecution>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with all middleware layers, backed by
/// in-process fakes for the platform services.
pub fn build_test_app() -> TestApp {
    build_test_app_with(FakeExecution::default(), FakeDataManagement::default())
}

pub fn build_test_app_with(execution: FakeExecution, data: FakeDataManagement) -> TestApp {
    let config = test_config();
    let execution = Arc::new(execution);
    let registry = Arc::new(WorkitemRegistry::new());
    let event_bus = Arc::new(EventBus::default());

    let orchestrator = WorkitemOrchestrator::new(
        Arc::clone(&execution) as Arc<dyn ExecutionService>,
        Arc::new(data),
        Arc::clone(&registry),
        Arc::clone(&event_bus) as Arc<dyn NotificationSink>,
        UpgradeSettings {
            activity_id: "nick.RCWMigratorAppActivity+dev".into(),
            callback_url: "http://localhost:3000/callback/designautomation".into(),
            supported_version_type: SUPPORTED_TYPE.into(),
        },
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        orchestrator,
        registry,
        observers: Arc::new(ObserverRegistry::new()),
        event_bus,
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        execution,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::delete(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_with_token(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, with_token(Request::post(uri), token)).await
}

pub async fn get_with_token(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, with_token(Request::get(uri), token)).await
}

pub async fn delete_with_token(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, with_token(Request::delete(uri), token)).await
}

fn with_token(builder: axum::http::request::Builder, token: &str) -> Request<Body> {
    builder
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// `/api/v1/upgrader/files/{source}/folders/{target}` with `/` encoded.
pub fn upgrade_uri(source: &str, target: &str) -> String {
    format!(
        "/api/v1/upgrader/files/{}/folders/{}",
        source.replace('/', "%2F"),
        target.replace('/', "%2F")
    )
}
