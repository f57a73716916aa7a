use std::sync::Arc;

use upgrader_core::registry::WorkitemRegistry;
use upgrader_events::EventBus;
use upgrader_lifecycle::WorkitemOrchestrator;

use crate::config::ServerConfig;
use crate::notifications::ObserverRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Submission, cancellation and completion of workitems.
    pub orchestrator: WorkitemOrchestrator,
    /// Outstanding workitems, shared with the orchestrator.
    pub registry: Arc<WorkitemRegistry>,
    /// Connected WebSocket notification observers.
    pub observers: Arc<ObserverRegistry>,
    /// Lifecycle notifications published by the orchestrator.
    pub event_bus: Arc<EventBus>,
}
