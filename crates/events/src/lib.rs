//! Lifecycle notification fan-out for the upgrader.
//!
//! - [`NotificationSink`]: the publishing seam the lifecycle orchestrator
//!   depends on.
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`WorkitemEvent`]: the terminal-transition envelope.

pub mod bus;

pub use bus::{EventBus, NotificationSink, WorkitemEvent};
