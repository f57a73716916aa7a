//! Workitem lifecycle orchestration.
//!
//! [`WorkitemOrchestrator`] ties the execution client, the data-management
//! collaborator, the [`WorkitemRegistry`](upgrader_core::registry::WorkitemRegistry)
//! and a [`NotificationSink`](upgrader_events::NotificationSink) together:
//! it submits upgrades, tracks them, and resolves each one exactly once,
//! either through cancellation or through the completion callback.

pub mod error;
pub mod orchestrator;
pub mod request;
pub mod settings;

pub use error::LifecycleError;
pub use orchestrator::{CompletionCallback, SubmissionAck, WorkitemOrchestrator};
pub use settings::UpgradeSettings;
