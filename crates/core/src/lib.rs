//! Core domain types for the cloud model upgrader.
//!
//! Holds the workitem data model, the in-memory [`registry`] of
//! outstanding workitems, reference parsing, and the shared error type.
//! Nothing in this crate performs network I/O.

pub mod error;
pub mod job_events;
pub mod reference;
pub mod registry;
pub mod types;
pub mod workitem;
