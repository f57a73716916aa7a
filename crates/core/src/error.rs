use crate::types::WorkitemId;
use crate::workitem::WorkitemStatus;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A record with this id is already tracked. Indicates a logic error.
    #[error("Workitem {0} is already tracked")]
    DuplicateId(WorkitemId),

    #[error("Workitem {0} not found")]
    NotFound(WorkitemId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: WorkitemStatus,
        to: WorkitemStatus,
    },
}
