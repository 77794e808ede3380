//! `WebSocket` event channel.
//!
//! Each participant connects to `GET /ws`. The connection is split: a
//! writer task drains the connection's outbox onto the socket while the
//! reader loop parses inbound frames into [`ClientEvent`]s and hands
//! them to the [`Coordinator`]. Frames that do not parse are logged and
//! dropped; the connection stays open.

use std::sync::Arc;

use aftershock_db::SessionLog;
use aftershock_types::{ClientEvent, ConnectionId, ServerEvent};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::{debug, warn};

use crate::coordinator::Coordinator;

/// Upgrade an HTTP request to a participant channel.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_channel<L: SessionLog>(
    ws: WebSocketUpgrade,
    State(coordinator): State<Arc<Coordinator<L>>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_channel(socket, coordinator))
}

/// Connection lifecycle: connect, pump frames until close, disconnect.
async fn handle_channel<L: SessionLog>(socket: WebSocket, coordinator: Arc<Coordinator<L>>) {
    let id = ConnectionId::new();
    let (sink, mut stream) = socket.split();
    let (tx, rx) = unbounded_channel();

    let writer = tokio::spawn(write_frames(sink, rx, id));
    coordinator.connect(id, tx).await;

    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match ClientEvent::parse(text.as_str()) {
                Ok(event) => {
                    debug!(conn = %id, event = event.name(), "event received");
                    coordinator.dispatch(id, event).await;
                }
                Err(e) => warn!(conn = %id, error = %e, "dropping malformed frame"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn = %id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Removing the outbox drops the sender, which ends the writer.
    coordinator.disconnect(id).await;
    if let Err(e) = writer.await {
        debug!(conn = %id, error = %e, "writer task ended abnormally");
    }
}

/// Forward queued events to the socket until the queue closes or the
/// peer goes away.
async fn write_frames(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: UnboundedReceiver<ServerEvent>,
    id: ConnectionId,
) {
    while let Some(event) = rx.recv().await {
        let frame = match event.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(conn = %id, event = event.name(), error = %e, "failed to encode event");
                continue;
            }
        };
        if sink.send(Message::Text(frame.into())).await.is_err() {
            debug!(conn = %id, "send failed, closing writer");
            return;
        }
    }
    if let Err(e) = sink.close().await {
        debug!(conn = %id, error = %e, "close failed");
    }
}
