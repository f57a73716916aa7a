//! REST client for the workitem execution endpoints.
//!
//! Wraps workitem submission, status queries and cancellation using
//! [`reqwest`]. The client holds no state beyond its configuration; every
//! call is a single request, repeated only under the [`RetryPolicy`].
//! Submission creates a remote job, so it is resent only when the server
//! provably never received it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AutomationConfig;
use crate::error::RemoteError;
use crate::retry::RetryPolicy;
use crate::token::TokenSource;
use crate::workitem::{WorkItemRequest, WorkItemSnapshot};

/// Remote execution service as seen by the lifecycle layer.
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Queue a workitem. Returns the server-assigned id and initial status.
    async fn submit(&self, request: &WorkItemRequest) -> Result<WorkItemSnapshot, RemoteError>;

    /// Fetch the current status snapshot of a workitem.
    async fn query(&self, workitem_id: &str) -> Result<WorkItemSnapshot, RemoteError>;

    /// Ask the service to cancel a workitem.
    ///
    /// Best-effort: the workitem may already be running or finished, and
    /// its completion callback may still arrive afterwards.
    async fn cancel(&self, workitem_id: &str) -> Result<(), RemoteError>;
}

/// HTTP client for the workitem endpoints.
pub struct DesignAutomationApi {
    client: reqwest::Client,
    endpoint: String,
    tokens: Arc<dyn TokenSource>,
    retry: RetryPolicy,
}

impl DesignAutomationApi {
    /// Create a client from configuration.
    pub fn new(config: &AutomationConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, RemoteError> {
        Ok(Self::with_client(
            config.http_client()?,
            config.da_endpoint.clone(),
            tokens,
            config.retry.clone(),
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling and for tests).
    ///
    /// * `endpoint` - API root, e.g. `https://host/da/us-east/v3`.
    pub fn with_client(
        client: reqwest::Client,
        endpoint: String,
        tokens: Arc<dyn TokenSource>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            tokens,
            retry,
        }
    }

    fn workitems_url(&self) -> String {
        format!("{}/workitems", self.endpoint)
    }

    /// URL of a single workitem. The id is appended as one percent-encoded
    /// path segment, so `/`, `?` and `#` cannot leave the `workitems` path.
    fn workitem_url(&self, workitem_id: &str) -> Result<reqwest::Url, RemoteError> {
        if workitem_id.is_empty() || workitem_id == "." || workitem_id == ".." {
            return Err(RemoteError::InvalidUrl(format!(
                "'{workitem_id}' is not a workitem id"
            )));
        }
        let mut url = reqwest::Url::parse(&self.workitems_url())
            .map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.endpoint.clone()))?
            .push(workitem_id);
        Ok(url)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`RemoteError::RemoteRejected`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RemoteError::RemoteRejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    ///
    /// The body is read as text first so that a shape mismatch surfaces as
    /// [`RemoteError::MalformedResponse`] rather than a transport error.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RemoteError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ExecutionService for DesignAutomationApi {
    async fn submit(&self, request: &WorkItemRequest) -> Result<WorkItemSnapshot, RemoteError> {
        let snapshot: WorkItemSnapshot = self
            .retry
            .run_if("submit_workitem", RemoteError::is_safe_to_resend, move || async move {
                let token = self.tokens.access_token().await?;
                let response = self
                    .client
                    .post(self.workitems_url())
                    .bearer_auth(token)
                    .json(request)
                    .send()
                    .await?;
                Self::parse_response(response).await
            })
            .await?;

        tracing::info!(
            workitem_id = %snapshot.id,
            status = %snapshot.status,
            activity_id = %request.activity_id,
            "Workitem submitted",
        );
        Ok(snapshot)
    }

    async fn query(&self, workitem_id: &str) -> Result<WorkItemSnapshot, RemoteError> {
        self.retry
            .run("query_workitem", move || async move {
                let url = self.workitem_url(workitem_id)?;
                let token = self.tokens.access_token().await?;
                let response = self
                    .client
                    .get(url)
                    .bearer_auth(token)
                    .send()
                    .await?;
                Self::parse_response(response).await
            })
            .await
    }

    async fn cancel(&self, workitem_id: &str) -> Result<(), RemoteError> {
        self.retry
            .run("cancel_workitem", move || async move {
                let url = self.workitem_url(workitem_id)?;
                let token = self.tokens.access_token().await?;
                let response = self
                    .client
                    .delete(url)
                    .bearer_auth(token)
                    .send()
                    .await?;
                Self::ensure_success(response).await?;
                Ok::<(), RemoteError>(())
            })
            .await?;

        tracing::info!(workitem_id, "Workitem cancellation accepted");
        Ok(())
    }
}
