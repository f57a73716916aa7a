use upgrader_automation::RemoteError;
use upgrader_core::error::CoreError;
use upgrader_core::types::WorkitemId;

/// Failures surfaced by the lifecycle orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Malformed caller input.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The workitem is not tracked, either never submitted or already resolved.
    #[error("Workitem {0} not found")]
    NotFound(WorkitemId),

    #[error("Source model not found")]
    SourceNotFound,

    #[error("Unsupported source type '{declared}'")]
    UnsupportedSourceType { declared: String },

    #[error("Target hub not found")]
    TargetNotFound,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for LifecycleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(id) => LifecycleError::NotFound(id),
            CoreError::Validation(msg) => LifecycleError::InvalidRequest(msg),
            other => LifecycleError::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn core_errors_map_to_caller_facing_variants() {
        assert_matches!(
            LifecycleError::from(CoreError::NotFound("wi-1".into())),
            LifecycleError::NotFound(id) if id == "wi-1"
        );
        assert_matches!(
            LifecycleError::from(CoreError::Validation("bad".into())),
            LifecycleError::InvalidRequest(msg) if msg == "bad"
        );
        assert_matches!(
            LifecycleError::from(CoreError::DuplicateId("wi-1".into())),
            LifecycleError::Core(CoreError::DuplicateId(_))
        );
    }

    #[test]
    fn unsupported_type_display() {
        let err = LifecycleError::UnsupportedSourceType {
            declared: "versions:autodesk.core:File".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported source type 'versions:autodesk.core:File'"
        );
    }
}
