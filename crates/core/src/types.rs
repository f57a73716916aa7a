/// Identifier assigned by the remote execution service to a workitem.
pub type WorkitemId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
