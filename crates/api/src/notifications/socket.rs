//! The `/api/v1/ws` observer endpoint.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use upgrader_events::WorkitemEvent;

use crate::state::AppState;

/// Why [`relay`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// The observer sent Close or its stream ended.
    ObserverClosed,
    /// A frame could not be written to the observer.
    SendFailed,
    /// The server is shutting down.
    Shutdown,
    /// The event bus was dropped.
    BusClosed,
}

/// GET /api/v1/ws
pub async fn observer_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_observer(socket, state))
}

async fn serve_observer(socket: WebSocket, state: AppState) {
    // Subscribe before anything else so no notification published after
    // the upgrade is missed.
    let mut events = state.event_bus.subscribe();
    let (observer_id, shutdown) = state.observers.join().await;
    tracing::info!(%observer_id, "Notification observer connected");

    let heartbeat = Duration::from_secs(state.config.observer_heartbeat_secs);
    let (tx, rx) = socket.split();
    let end = relay(tx, rx, &mut events, &shutdown, heartbeat).await;

    state.event_bus.unsubscribe(events);
    let connected_secs = state
        .observers
        .leave(observer_id)
        .await
        .map(|d| d.as_secs());
    tracing::info!(%observer_id, ?end, ?connected_secs, "Notification observer disconnected");
}

/// Push every workitem notification from `events` to one observer until
/// the observer leaves, a write fails, `shutdown` fires or the bus closes.
///
/// A Ping frame is written every `heartbeat`. Inbound frames other than
/// Close are ignored; observers only listen.
pub async fn relay<Tx, Rx>(
    mut tx: Tx,
    mut rx: Rx,
    events: &mut broadcast::Receiver<WorkitemEvent>,
    shutdown: &CancellationToken,
    heartbeat: Duration,
) -> RelayEnd
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let heartbeat = heartbeat.max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = tx.send(Message::Close(None)).await;
                return RelayEnd::Shutdown;
            }
            received = events.recv() => match received {
                Ok(event) => {
                    let frame = Message::Text(event.to_message().to_string().into());
                    if tx.send(frame).await.is_err() {
                        return RelayEnd::SendFailed;
                    }
                    tracing::debug!(
                        workitem_id = %event.workitem_id,
                        status = event.notification_label(),
                        "Notification delivered to observer",
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Observer fell behind, notifications skipped");
                }
                Err(RecvError::Closed) => return RelayEnd::BusClosed,
            },
            _ = ticker.tick() => {
                if tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    return RelayEnd::SendFailed;
                }
            }
            inbound = rx.next() => match inbound {
                None | Some(Ok(Message::Close(_))) => return RelayEnd::ObserverClosed,
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "Observer receive error");
                    return RelayEnd::ObserverClosed;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}
