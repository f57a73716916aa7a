//! Clients for the remote automation platform.
//!
//! Provides the workitem execution client ([`api::DesignAutomationApi`]),
//! the data-management collaborator used to resolve source models and
//! destination hubs ([`data::DataManagementApi`]), typed request and
//! response shapes, and the retry policy applied to outbound calls.
//!
//! The trait seams ([`api::ExecutionService`], [`data::DataManagement`],
//! [`token::TokenSource`]) let the lifecycle layer run against fakes.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod retry;
pub mod token;
pub mod workitem;

pub use api::{DesignAutomationApi, ExecutionService};
pub use config::AutomationConfig;
pub use data::{ArtifactVersion, ContainerRef, DataManagement, DataManagementApi};
pub use error::RemoteError;
pub use retry::RetryPolicy;
pub use token::{Credentials, StaticToken, TokenSource};
pub use workitem::{ArgumentBinding, Verb, WorkItemRequest, WorkItemSnapshot};
