//! In-memory registry of outstanding workitems.
//!
//! [`WorkitemRegistry`] is the single source of truth for whether a
//! workitem is still being tracked. It is designed to be wrapped in `Arc`
//! and shared across request handlers. Records are not persisted; a
//! process restart forgets every in-flight workitem.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::types::WorkitemId;
use crate::workitem::WorkitemRecord;

/// Thread-safe table of outstanding workitems keyed by id.
///
/// A single `RwLock` guards the whole map. Callers must never hold a
/// guard across network I/O; every method here acquires and releases the
/// lock internally.
pub struct WorkitemRegistry {
    records: RwLock<HashMap<WorkitemId, WorkitemRecord>>,
}

impl WorkitemRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Track a new record.
    ///
    /// Fails with [`CoreError::DuplicateId`] if the id is already present;
    /// the existing record is left untouched.
    pub async fn insert(&self, record: WorkitemRecord) -> Result<(), CoreError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(CoreError::DuplicateId(record.id));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Look up a record by id.
    pub async fn get(&self, id: &str) -> Result<WorkitemRecord, CoreError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Atomically take a record out of the registry.
    ///
    /// When two callers race to remove the same id exactly one receives
    /// the record; the other gets [`CoreError::NotFound`].
    pub async fn remove(&self, id: &str) -> Result<WorkitemRecord, CoreError> {
        self.records
            .write()
            .await
            .remove(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Snapshot of every tracked record, oldest submission first.
    pub async fn list_all(&self) -> Vec<WorkitemRecord> {
        let mut records: Vec<WorkitemRecord> =
            self.records.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.submitted_at);
        records
    }

    /// Number of tracked records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for WorkitemRegistry {
    fn default() -> Self {
        Self::new()
    }
}
