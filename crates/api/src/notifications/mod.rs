//! Real-time workitem notifications for WebSocket observers.
//!
//! Every observer socket holds its own [`EventBus`](upgrader_events::EventBus)
//! subscription and its own heartbeat timer; [`ObserverRegistry`] only
//! counts observers and closes them all on shutdown.

pub mod observers;
pub mod socket;

pub use observers::ObserverRegistry;
pub use socket::{observer_socket, relay, RelayEnd};
