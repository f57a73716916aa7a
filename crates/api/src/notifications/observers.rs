use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use upgrader_core::types::Timestamp;
use uuid::Uuid;

/// Connected notification observers.
///
/// Each observer gets a child of one shutdown token, so [`close_all`]
/// reaches sockets that are mid-handshake as well as established ones.
///
/// [`close_all`]: ObserverRegistry::close_all
pub struct ObserverRegistry {
    connected: RwLock<HashMap<Uuid, Timestamp>>,
    shutdown: CancellationToken,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            connected: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// Register an observer. The returned token fires when the server
    /// closes observers; after [`close_all`](Self::close_all) it is already
    /// cancelled.
    pub async fn join(&self) -> (Uuid, CancellationToken) {
        let id = Uuid::new_v4();
        self.connected.write().await.insert(id, chrono::Utc::now());
        (id, self.shutdown.child_token())
    }

    /// Forget an observer. Returns how long it was connected.
    pub async fn leave(&self, id: Uuid) -> Option<Duration> {
        let joined = self.connected.write().await.remove(&id)?;
        (chrono::Utc::now() - joined).to_std().ok()
    }

    pub async fn count(&self) -> usize {
        self.connected.read().await.len()
    }

    /// Ask every current and future observer to close.
    pub async fn close_all(&self) {
        let count = self.count().await;
        self.shutdown.cancel();
        tracing::info!(count, "Closing notification observers");
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_and_leave_track_count() {
        let observers = ObserverRegistry::new();
        let (a, _) = observers.join().await;
        let (b, _) = observers.join().await;
        assert_eq!(observers.count().await, 2);

        assert!(observers.leave(a).await.is_some());
        assert!(observers.leave(a).await.is_none());
        assert_eq!(observers.count().await, 1);

        observers.leave(b).await;
        assert_eq!(observers.count().await, 0);
    }

    #[tokio::test]
    async fn close_all_cancels_current_and_late_observers() {
        let observers = ObserverRegistry::new();
        let (_, early) = observers.join().await;
        assert!(!early.is_cancelled());

        observers.close_all().await;
        assert!(early.is_cancelled());

        let (_, late) = observers.join().await;
        assert!(late.is_cancelled());
    }
}
