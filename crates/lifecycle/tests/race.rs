//! Cancellation racing the completion callback.

mod common;

use std::sync::Arc;

use common::{callback, credentials, harness};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn cancel_and_callback_resolve_exactly_once() {
    let h = harness();
    let ids: Vec<String> = {
        let mut ids = Vec::new();
        for _ in 0..50 {
            let ack = h
                .orchestrator
                .start("items/abc", "folders/xyz", &credentials())
                .await
                .unwrap();
            ids.push(ack.workitem_id);
        }
        ids
    };

    let orchestrator = Arc::new(h.orchestrator.clone());
    let mut tasks = Vec::new();
    for id in &ids {
        let cancel = {
            let orchestrator = Arc::clone(&orchestrator);
            let id = id.clone();
            tokio::spawn(async move { orchestrator.cancel(&id).await.is_ok() })
        };
        let complete = {
            let orchestrator = Arc::clone(&orchestrator);
            let id = id.clone();
            tokio::spawn(async move {
                orchestrator
                    .resolve_completion(callback(&id, "success"))
                    .await
                    .is_some()
            })
        };
        tasks.push((id.clone(), cancel, complete));
    }

    for (id, cancel, complete) in tasks {
        let cancelled = cancel.await.unwrap();
        let completed = complete.await.unwrap();
        assert!(cancelled ^ completed, "{id}: exactly one path must win");
        assert_eq!(h.sink.events_for(&id), 1, "{id}: exactly one publication");
    }

    assert!(h.registry.is_empty().await);
}
