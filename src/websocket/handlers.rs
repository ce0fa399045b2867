use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::services::relay::RelayService;
use crate::state::AppState;
use crate::websocket::message_types::WsInboundEvent;
use crate::websocket::ConnectionId;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Next relayed payload for this connection, or pending forever while the
/// connection is anonymous or superseded.
async fn next_delivery(rx: &mut Option<UnboundedReceiver<String>>) -> Option<String> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Per-connection state machine: Connected(anonymous) -> Bound -> Closed.
///
/// `bound` holds the identity this connection registered under. It is the
/// connection's own record, not the registry's: a superseded connection keeps
/// sending under its bound identity even though the registry no longer
/// resolves that user to it.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();

    let mut bound: Option<(Uuid, ConnectionId)> = None;
    let mut delivery_rx: Option<UnboundedReceiver<String>> = None;

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut last_seen = Instant::now();

    loop {
        tokio::select! {
            maybe = next_delivery(&mut delivery_rx) => {
                match maybe {
                    Some(payload) => {
                        if sender.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // Channel closed: a newer connection took over this
                    // user's binding. The connection stays open but stops
                    // receiving live deliveries.
                    None => delivery_rx = None,
                }
            }

            _ = heartbeat.tick() => {
                if last_seen.elapsed() > CLIENT_TIMEOUT {
                    debug!("websocket heartbeat timed out, closing");
                    break;
                }
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }

            incoming = receiver.next() => {
                if !handle_incoming(&state, incoming, &mut bound, &mut delivery_rx, &mut last_seen).await {
                    break;
                }
            }
        }
    }

    // Single cleanup point, reached exactly once whichever path ended the
    // loop. Removal is keyed by connection id, so a stale disconnect cannot
    // evict a binding a reconnect has already replaced.
    if let Some((user_id, connection_id)) = bound {
        state.registry.remove(user_id, connection_id).await;
        debug!(%user_id, "connection closed");
    }
}

/// Returns false when the connection should close.
async fn handle_incoming(
    state: &AppState,
    incoming: Option<Result<Message, axum::Error>>,
    bound: &mut Option<(Uuid, ConnectionId)>,
    delivery_rx: &mut Option<UnboundedReceiver<String>>,
    last_seen: &mut Instant,
) -> bool {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            *last_seen = Instant::now();
            match serde_json::from_str::<WsInboundEvent>(&text) {
                Ok(event) => handle_ws_event(state, event, bound, delivery_rx).await,
                Err(e) => warn!(error = %e, "ignoring malformed websocket event"),
            }
            true
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
            *last_seen = Instant::now();
            true
        }
        Some(Ok(Message::Binary(_))) => {
            *last_seen = Instant::now();
            warn!("binary websocket messages not supported");
            true
        }
        Some(Ok(Message::Close(_))) | None => false,
        Some(Err(e)) => {
            debug!(error = %e, "websocket transport error");
            false
        }
    }
}

async fn handle_ws_event(
    state: &AppState,
    event: WsInboundEvent,
    bound: &mut Option<(Uuid, ConnectionId)>,
    delivery_rx: &mut Option<UnboundedReceiver<String>>,
) {
    match event {
        WsInboundEvent::Identify { user_id } => {
            // Re-identifying as a different user releases the old binding;
            // re-identifying as the same user is handled by the registry
            // overwrite.
            if let Some((prev_user, prev_id)) = bound.take() {
                if prev_user != user_id {
                    state.registry.remove(prev_user, prev_id).await;
                }
            }
            let (connection_id, rx) = state.registry.register(user_id).await;
            *bound = Some((user_id, connection_id));
            *delivery_rx = Some(rx);
            debug!(%user_id, "connection bound");
        }

        WsInboundEvent::Send { recipient_id, body } => {
            let Some((sender_id, _)) = *bound else {
                warn!("ignoring send from unidentified connection");
                return;
            };
            if let Err(e) = RelayService::relay(
                state.archive.as_ref(),
                &state.registry,
                sender_id,
                recipient_id,
                &body,
            )
            .await
            {
                tracing::error!(error = %e, %sender_id, %recipient_id, "relay failed");
            }
        }
    }
}
