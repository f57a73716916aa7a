//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`WorkitemEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use upgrader_core::job_events::MSG_TYPE_WORKITEM_NOTIFICATION;
use upgrader_core::types::WorkitemId;
use upgrader_core::workitem::{CorrelationContext, WorkitemStatus};

// ---------------------------------------------------------------------------
// WorkitemEvent
// ---------------------------------------------------------------------------

/// A lifecycle transition of one workitem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkitemEvent {
    pub workitem_id: WorkitemId,

    /// New status. Only terminal statuses are published.
    pub status: WorkitemStatus,

    /// Caller metadata recorded at submission, passed through unchanged.
    pub context: CorrelationContext,

    /// When the transition was observed (UTC).
    pub timestamp: DateTime<Utc>,
}

impl WorkitemEvent {
    pub fn new(
        workitem_id: impl Into<WorkitemId>,
        status: WorkitemStatus,
        context: CorrelationContext,
    ) -> Self {
        Self {
            workitem_id: workitem_id.into(),
            status,
            context,
            timestamp: Utc::now(),
        }
    }

    /// Label shown to observers: `Completed`, `Failed` or `Cancelled`.
    pub fn notification_label(&self) -> &'static str {
        self.status
            .notification_label()
            .unwrap_or(upgrader_core::job_events::STATUS_FAILED)
    }

    /// The JSON message pushed to real-time observers.
    pub fn to_message(&self) -> serde_json::Value {
        serde_json::json!({
            "type": MSG_TYPE_WORKITEM_NOTIFICATION,
            "WorkitemId": self.workitem_id,
            "Status": self.notification_label(),
        })
    }
}

// ---------------------------------------------------------------------------
// NotificationSink
// ---------------------------------------------------------------------------

/// Destination for lifecycle transitions.
///
/// Implementations must return promptly and never fail the caller, whether
/// or not anyone is listening.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: WorkitemEvent);
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`WorkitemEvent`]. A subscriber
/// only sees events published after it subscribed.
///
/// # Usage
///
/// ```rust
/// use upgrader_core::workitem::{CorrelationContext, WorkitemStatus};
/// use upgrader_events::{EventBus, NotificationSink, WorkitemEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(WorkitemEvent::new(
///     "wi-1",
///     WorkitemStatus::Succeeded,
///     CorrelationContext::default(),
/// ));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<WorkitemEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all events published on this bus from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkitemEvent> {
        self.sender.subscribe()
    }

    /// Stop receiving events on `receiver`.
    pub fn unsubscribe(&self, receiver: broadcast::Receiver<WorkitemEvent>) {
        drop(receiver);
        tracing::debug!(
            remaining = self.sender.receiver_count(),
            "Notification subscriber removed"
        );
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for EventBus {
    fn publish(&self, event: WorkitemEvent) {
        // A send error only means there are zero receivers.
        if self.sender.send(event).is_err() {
            tracing::debug!("No notification subscribers, event dropped");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
