//! `WebSocket` handler for the robot event stream.
//!
//! Clients connect to `GET /api/ws`. The first frame is a `status_update`
//! carrying the state at connect time; every broadcast event follows as a
//! JSON text frame. Frames sent by the client are ignored apart from
//! pings and close.
//!
//! Each connection owns one broadcaster subscription. When the
//! broadcaster evicts it (too slow) or closes (shutdown), the stream ends
//! and the socket is closed.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use cleanbot_types::RobotEvent;
use tracing::{debug, warn};

use crate::error::ObserverError;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` and begin streaming events.
///
/// # Route
///
/// `GET /api/ws`
///
/// # Errors
///
/// Returns 503 once shutdown has begun.
pub async fn ws_robot(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ObserverError> {
    if state.lifecycle.is_shutting_down() {
        return Err(ObserverError::Unavailable("server is shutting down".to_owned()));
    }
    Ok(ws.on_upgrade(|socket| handle_ws(socket, state)))
}

/// Encode one event as a text frame.
pub fn event_frame(event: &RobotEvent) -> Option<Message> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!(event = event.kind(), "Failed to serialize robot event: {e}");
            None
        }
    }
}

/// Forward events to the socket until either side goes away.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut subscription = match state.controller.subscribe().await {
        Ok(subscription) => subscription,
        Err(e) => {
            debug!(error = %e, "Refusing WebSocket client");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    let subscriber_id = subscription.id();
    debug!(%subscriber_id, "WebSocket client connected");

    loop {
        tokio::select! {
            // Next event from the broadcaster.
            event = subscription.recv() => {
                let Some(event) = event else {
                    debug!(%subscriber_id, "Subscription ended, closing WebSocket");
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                };
                let Some(frame) = event_frame(&event) else {
                    continue;
                };
                if socket.send(frame).await.is_err() {
                    debug!(%subscriber_id, "WebSocket client disconnected (send failed)");
                    break;
                }
            }
            // Client close, ping or disconnect.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%subscriber_id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%subscriber_id, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%subscriber_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.controller.unsubscribe(subscriber_id);
}
