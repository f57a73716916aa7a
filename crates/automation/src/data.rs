//! Data-management collaborator.
//!
//! Resolves the latest version of a source model and the hub owning a
//! destination project. Folder browsing and version creation are not
//! part of the upgrader and are not modelled here.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::AutomationConfig;
use crate::error::RemoteError;
use crate::retry::RetryPolicy;
use crate::token::Credentials;

/// Latest version of a source model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactVersion {
    /// Storage location the execution service downloads the model from.
    pub storage_reference: String,
    /// Declared version type, e.g. `versions:autodesk.bim360:C4RModel`.
    pub declared_type: String,
    /// File name shown to the user.
    pub display_name: String,
}

/// Container (hub) owning a destination project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRef {
    pub id: String,
}

/// Lookups the lifecycle layer needs from the data-management service.
///
/// Both methods return `Ok(None)` when the resource does not exist.
#[async_trait]
pub trait DataManagement: Send + Sync {
    async fn resolve_latest_artifact(
        &self,
        project_id: Option<&str>,
        item_id: &str,
        credentials: &Credentials,
    ) -> Result<Option<ArtifactVersion>, RemoteError>;

    async fn resolve_container_for_target(
        &self,
        project_id: Option<&str>,
        credentials: &Credentials,
    ) -> Result<Option<ContainerRef>, RemoteError>;
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Resource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct VersionResource {
    id: String,
    attributes: VersionAttributes,
    #[serde(default)]
    relationships: Option<VersionRelationships>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionAttributes {
    #[serde(alias = "displayName")]
    name: String,
    extension: Extension,
}

#[derive(Debug, Deserialize)]
struct Extension {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct VersionRelationships {
    #[serde(default)]
    storage: Option<Relationship>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    data: Resource,
}

impl From<VersionResource> for ArtifactVersion {
    fn from(version: VersionResource) -> Self {
        let storage_reference = version
            .relationships
            .and_then(|r| r.storage)
            .map(|s| s.data.id)
            .unwrap_or(version.id);
        Self {
            storage_reference,
            declared_type: version.attributes.extension.kind,
            display_name: version.attributes.name,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// HTTP client for the data-management REST API.
pub struct DataManagementApi {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl DataManagementApi {
    pub fn new(config: &AutomationConfig) -> Result<Self, RemoteError> {
        Ok(Self::with_client(
            config.http_client()?,
            config.base_url.clone(),
            config.retry.clone(),
        ))
    }

    pub fn with_client(client: reqwest::Client, base_url: String, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// `base_url` followed by `segments`, each percent-encoded as a single
    /// path segment. Ids taken from caller references cannot add segments.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, RemoteError> {
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
            return Err(RemoteError::InvalidUrl(format!("'{bad}' is not a valid id")));
        }
        let mut url =
            reqwest::Url::parse(&self.base_url).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` with the caller's token. A 404 is reported as `Ok(None)`.
    async fn get_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: reqwest::Url,
        credentials: &Credentials,
    ) -> Result<Option<T>, RemoteError> {
        let url = &url;
        self.retry
            .run("data_management_get", move || async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::AUTHORIZATION, credentials.bearer())
                    .send()
                    .await?;

                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }
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

                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map(Some)
                    .map_err(|e| RemoteError::MalformedResponse(e.to_string()))
            })
            .await
    }
}

#[async_trait]
impl DataManagement for DataManagementApi {
    async fn resolve_latest_artifact(
        &self,
        project_id: Option<&str>,
        item_id: &str,
        credentials: &Credentials,
    ) -> Result<Option<ArtifactVersion>, RemoteError> {
        let Some(project_id) = project_id else {
            tracing::debug!(item_id, "No project in source reference, cannot resolve versions");
            return Ok(None);
        };

        let url = self.url(&["data", "v1", "projects", project_id, "items", item_id, "versions"])?;
        let versions: Option<ListResponse<VersionResource>> =
            self.get_optional(url, credentials).await?;

        // Versions are listed newest first.
        Ok(versions
            .and_then(|list| list.data.into_iter().next())
            .map(ArtifactVersion::from))
    }

    async fn resolve_container_for_target(
        &self,
        project_id: Option<&str>,
        credentials: &Credentials,
    ) -> Result<Option<ContainerRef>, RemoteError> {
        let Some(project_id) = project_id else {
            return Ok(None);
        };

        let hubs_url = self.url(&["project", "v1", "hubs"])?;
        let hubs: ListResponse<Resource> = self
            .get_optional(hubs_url, credentials)
            .await?
            .unwrap_or(ListResponse { data: Vec::new() });

        for hub in hubs.data {
            let projects_url = self.url(&["project", "v1", "hubs", &hub.id, "projects"])?;
            let projects: Option<ListResponse<Resource>> =
                match self.get_optional(projects_url, credentials).await {
                    Ok(projects) => projects,
                    Err(e) => {
                        // One inaccessible hub must not hide the others.
                        tracing::debug!(hub_id = %hub.id, error = %e, "Skipping hub");
                        continue;
                    }
                };

            if projects.is_some_and(|list| list.data.iter().any(|p| p.id == project_id)) {
                return Ok(Some(ContainerRef { id: hub.id }));
            }
        }

        Ok(None)
    }
}
