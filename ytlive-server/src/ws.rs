//! ytlive-server/src/ws.rs
//!
//! `GET /ws?user_id=...` joins the user's room on the event bus and streams
//! `channel:live` events as JSON text frames.

use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use ytlive_core::eventbus::UserEventBus;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub user_id: Uuid,
}

pub fn router(bus: UserEventBus) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(bus)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(bus): State<UserEventBus>,
    Query(query): Query<WsQuery>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, bus, query.user_id))
}

async fn handle_socket(socket: WebSocket, bus: UserEventBus, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = bus.subscribe(user_id, None);
    let mut shutdown_rx = bus.shutdown_rx.clone();
    info!("Client connected for user {} ({} open)", user_id, bus.connection_count(user_id));

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("WebSocket receive error for user {}: {}", user_id, e);
                        break;
                    }
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(t) => t,
                    Err(e) => {
                        warn!("Failed to encode {} for user {}: {}", event.name(), user_id, e);
                        continue;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    debug!("Client for user {} went away mid-send", user_id);
                    break;
                }
            }
            Ok(_) = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    }

    drop(events);
    bus.leave(user_id);
    info!("Client disconnected for user {}", user_id);
}
