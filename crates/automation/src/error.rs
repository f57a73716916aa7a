//! Error type shared by the outbound platform clients.

/// Failure of a call to a remote platform service.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service returned a non-2xx status code.
    #[error("Remote service rejected the request ({status}): {message}")]
    RemoteRejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        message: String,
    },

    /// The response body could not be parsed into the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A request URL could not be built from the configured endpoint.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl RemoteError {
    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures, throttling (429) and server errors (5xx) are
    /// transient; other rejections and malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Transport(_) => true,
            RemoteError::RemoteRejected { status, .. } => *status == 429 || *status >= 500,
            RemoteError::MalformedResponse(_) | RemoteError::InvalidUrl(_) => false,
        }
    }

    /// Whether a non-idempotent request can be sent again.
    ///
    /// Only failures where the server provably did not act on the request
    /// qualify: a refused connection, or a 429 rejection. Timeouts and 5xx
    /// responses may follow a request the server already accepted.
    pub fn is_safe_to_resend(&self) -> bool {
        match self {
            RemoteError::Transport(e) => e.is_connect(),
            RemoteError::RemoteRejected { status, .. } => *status == 429,
            RemoteError::MalformedResponse(_) | RemoteError::InvalidUrl(_) => false,
        }
    }
}
