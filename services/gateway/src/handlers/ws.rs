use std::collections::HashMap;

use crate::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use chrono::Utc;
use feed::{
    parse_client_message, Broadcaster, ClientId, ClientMessage, JoinOutcome, ServerMessage,
    Subscription, SubscriptionEvent,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use types::ids::MatchId;

/// Frames queued per connection before room forwarders start to wait.
const OUTBOUND_BUFFER: usize = 64;

/// Forwarding task per joined room
type Rooms = HashMap<MatchId, JoinHandle<()>>;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = state.registry.lock().await.register(Utc::now());
    info!(client_id, "Viewer connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let mut rooms = Rooms::new();
    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => {
                let reply = handle_control(&state, client_id, text.as_str(), &tx, &mut rooms).await;
                if !send_json(&tx, &reply).await {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    for (_, task) in rooms.drain() {
        task.abort();
    }
    state.registry.lock().await.disconnect(client_id);
    drop(tx);
    let _ = writer.await;
    info!(client_id, "Viewer disconnected");
}

/// Apply one control frame and produce the reply.
async fn handle_control(
    state: &AppState,
    client_id: ClientId,
    text: &str,
    tx: &mpsc::Sender<String>,
    rooms: &mut Rooms,
) -> ServerMessage {
    let message = match parse_client_message(text) {
        Ok(message) => message,
        Err(message) => {
            debug!(client_id, %message, "Rejected client frame");
            return ServerMessage::Error { message };
        }
    };

    match message {
        ClientMessage::JoinMatch { match_id } => {
            if let Err(e) = state.ledger.get_match(&match_id).await {
                return ServerMessage::Error {
                    message: e.to_string(),
                };
            }

            let joined = state.registry.lock().await.join(client_id, match_id.clone());
            match joined {
                Ok(JoinOutcome::Joined) => {
                    let subscription = state.hub.subscribe(&match_id);
                    rooms.insert(
                        match_id.clone(),
                        tokio::spawn(forward_room(subscription, tx.clone())),
                    );
                    info!(client_id, match_id = %match_id, "Viewer joined match");
                    ServerMessage::JoinedMatch { match_id }
                }
                Ok(JoinOutcome::AlreadyJoined) => ServerMessage::JoinedMatch { match_id },
                Err(e) => ServerMessage::Error {
                    message: e.to_string(),
                },
            }
        }
        ClientMessage::LeaveMatch { match_id } => {
            state.registry.lock().await.leave(client_id, &match_id);
            if let Some(task) = rooms.remove(&match_id) {
                task.abort();
                info!(client_id, match_id = %match_id, "Viewer left match");
            }
            ServerMessage::LeftMatch { match_id }
        }
    }
}

/// Pump one room's signals into the connection's outbound queue.
async fn forward_room(mut subscription: Subscription, tx: mpsc::Sender<String>) {
    loop {
        let sent = match subscription.recv().await {
            SubscriptionEvent::Signal(signal) => send_json(&tx, &signal).await,
            SubscriptionEvent::Lagged { skipped } => {
                let notice = ServerMessage::Lagged {
                    match_id: subscription.match_id().clone(),
                    skipped,
                };
                send_json(&tx, &notice).await
            }
            SubscriptionEvent::Closed => break,
        };
        if !sent {
            break;
        }
    }
}

/// Queue a JSON frame. Returns false once the connection is gone.
async fn send_json<T: Serialize>(tx: &mpsc::Sender<String>, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(text) => tx.send(text).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to encode outbound frame");
            true
        }
    }
}
