use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use upgrader_automation::RemoteError;
use upgrader_lifecycle::LifecycleError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`LifecycleError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from the lifecycle orchestrator.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Missing or malformed caller credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- LifecycleError variants ---
            AppError::Lifecycle(err) => match err {
                LifecycleError::InvalidRequest(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
                }
                LifecycleError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                LifecycleError::SourceNotFound => {
                    (StatusCode::NOT_FOUND, "SOURCE_NOT_FOUND", err.to_string())
                }
                LifecycleError::TargetNotFound => {
                    (StatusCode::NOT_FOUND, "TARGET_NOT_FOUND", err.to_string())
                }
                LifecycleError::UnsupportedSourceType { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "UNSUPPORTED_SOURCE_TYPE",
                    err.to_string(),
                ),
                LifecycleError::Remote(remote) => classify_remote_error(remote),
                LifecycleError::Core(core) => {
                    tracing::error!(error = %core, "Internal lifecycle error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify an outbound platform failure into an HTTP status, error code,
/// and message.
///
/// - A remote 404 maps to 404.
/// - An id that cannot form an outbound URL maps to 400.
/// - Every other remote failure maps to 502; the remote body is logged,
///   not returned.
fn classify_remote_error(err: &RemoteError) -> (StatusCode, &'static str, String) {
    match err {
        RemoteError::RemoteRejected { status: 404, .. } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found on the remote service".to_string(),
        ),
        RemoteError::RemoteRejected { status, message } => {
            tracing::warn!(status, message = %message, "Remote service rejected request");
            (
                StatusCode::BAD_GATEWAY,
                "REMOTE_REJECTED",
                format!("Remote service rejected the request ({status})"),
            )
        }
        RemoteError::Transport(e) => {
            tracing::error!(error = %e, "Remote service unreachable");
            (
                StatusCode::BAD_GATEWAY,
                "REMOTE_UNAVAILABLE",
                "Remote service is unavailable".to_string(),
            )
        }
        RemoteError::InvalidUrl(e) => {
            tracing::warn!(error = %e, "Outbound request URL rejected");
            (
                StatusCode::BAD_REQUEST,
                "INVALID_REQUEST",
                "Identifier cannot be sent to the remote service".to_string(),
            )
        }
        RemoteError::MalformedResponse(e) => {
            tracing::error!(error = %e, "Malformed remote response");
            (
                StatusCode::BAD_GATEWAY,
                "REMOTE_MALFORMED_RESPONSE",
                "Remote service returned an unexpected response".to_string(),
            )
        }
    }
}
