//! Real-time message constants for workitem lifecycle events.
//!
//! Used by the API crate when forwarding terminal transitions to
//! connected WebSocket clients.

/// Topic carried in the `type` field of every workitem notification.
pub const MSG_TYPE_WORKITEM_NOTIFICATION: &str = "Workitem-Notification";

/// Workitem finished successfully.
pub const STATUS_COMPLETED: &str = "Completed";

/// Workitem finished with an error.
pub const STATUS_FAILED: &str = "Failed";

/// Workitem cancellation was accepted by the remote service.
pub const STATUS_CANCELLED: &str = "Cancelled";
