//! Periodic report of workitems that never resolved.
//!
//! The execution service delivers its completion callback at most once. A
//! lost callback leaves a record in the registry forever, so this task logs
//! every record older than the configured age. It never removes records.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use upgrader_core::registry::WorkitemRegistry;
use upgrader_core::types::Timestamp;
use upgrader_core::workitem::WorkitemRecord;

/// How often the registry is scanned.
const CHECK_INTERVAL: Duration = Duration::from_secs(300);

/// Run the stale workitem check loop until `cancel` is triggered.
pub async fn run(registry: Arc<WorkitemRegistry>, max_age: Duration, cancel: CancellationToken) {
    tracing::info!(
        max_age_secs = max_age.as_secs(),
        interval_secs = CHECK_INTERVAL.as_secs(),
        "Stale workitem monitor started"
    );

    let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
    let mut interval = tokio::time::interval(CHECK_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stale workitem monitor stopping");
                break;
            }
            _ = interval.tick() => {
                let records = registry.list_all().await;
                let stale = stale_records(&records, Utc::now(), max_age);
                if stale.is_empty() {
                    tracing::debug!(tracked = records.len(), "No stale workitems");
                }
                for record in stale {
                    tracing::warn!(
                        workitem_id = %record.id,
                        submitted_at = %record.submitted_at,
                        file_name = %record.context.display_name,
                        "Workitem has not resolved, completion callback may be lost",
                    );
                }
            }
        }
    }
}

/// Records outstanding for longer than `max_age` as of `now`.
pub fn stale_records(
    records: &[WorkitemRecord],
    now: Timestamp,
    max_age: chrono::Duration,
) -> Vec<&WorkitemRecord> {
    records.iter().filter(|r| r.age(now) > max_age).collect()
}
