//! Workitem data model.
//!
//! A [`WorkitemRecord`] describes one outstanding conversion job submitted
//! to the remote execution service. Records only ever move forward toward
//! a terminal [`WorkitemStatus`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::job_events::{STATUS_CANCELLED, STATUS_COMPLETED, STATUS_FAILED};
use crate::types::{Timestamp, WorkitemId};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a workitem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkitemStatus {
    /// Accepted by the remote service and tracked locally.
    Submitted,
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl WorkitemStatus {
    /// Collapse a status string reported by the remote service.
    ///
    /// The remote vocabulary is `pending`, `inprogress`, `success`,
    /// `cancelled` and a family of `failed*` statuses. Anything else maps
    /// to [`WorkitemStatus::Failed`] and is logged.
    pub fn from_remote(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "inprogress" => Self::Running,
            "success" => Self::Succeeded,
            "cancelled" => Self::Cancelled,
            s if s.starts_with("failed") => Self::Failed,
            _ => {
                tracing::warn!(status = raw, "Unrecognized remote workitem status, treating as failed");
                Self::Failed
            }
        }
    }

    /// Whether no further transition is allowed out of this status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Submitted => 0,
            Self::Pending => 1,
            Self::Running => 2,
            Self::Succeeded | Self::Failed | Self::Cancelled => 3,
        }
    }

    /// Transitions must move strictly forward and never leave a terminal state.
    pub fn can_transition_to(self, next: Self) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    /// Label broadcast to real-time observers, for terminal statuses only.
    pub fn notification_label(self) -> Option<&'static str> {
        match self {
            Self::Succeeded => Some(STATUS_COMPLETED),
            Self::Failed => Some(STATUS_FAILED),
            Self::Cancelled => Some(STATUS_CANCELLED),
            _ => None,
        }
    }
}

impl fmt::Display for WorkitemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Submitted => "Submitted",
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Check a caller-supplied workitem id before it is used in a lookup.
///
/// Ids assigned by the execution service are ASCII alphanumerics with
/// `-`, `_` and `.`; `.` and `..` on their own are rejected.
pub fn validate_workitem_id(id: &str) -> Result<(), CoreError> {
    let well_formed = !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if well_formed {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("'{id}' is not a valid workitem id")))
    }
}

/// Caller metadata needed to act on completion. Passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationContext {
    /// Source item reference as supplied by the caller.
    pub source: String,
    /// Destination folder reference as supplied by the caller.
    pub target: String,
    /// Display name of the model being upgraded.
    pub display_name: String,
}

/// One outstanding workitem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkitemRecord {
    pub id: WorkitemId,
    pub status: WorkitemStatus,
    pub context: CorrelationContext,
    pub submitted_at: Timestamp,
}

impl WorkitemRecord {
    /// A freshly submitted record, stamped with the current time.
    pub fn submitted(id: impl Into<WorkitemId>, context: CorrelationContext) -> Self {
        Self {
            id: id.into(),
            status: WorkitemStatus::Submitted,
            context,
            submitted_at: chrono::Utc::now(),
        }
    }

    /// Move the record to `next`, rejecting backward or post-terminal moves.
    pub fn transition(mut self, next: WorkitemStatus) -> Result<Self, CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(self)
    }

    /// Time the record has been outstanding, as of `now`.
    pub fn age(&self, now: Timestamp) -> chrono::Duration {
        now - self.submitted_at
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
