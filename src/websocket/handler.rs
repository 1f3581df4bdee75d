use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::WhiteboardError;
use crate::websocket::message::{ClientEvent, ServerEvent};
use crate::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle a WebSocket connection from open to close
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Create channel for outgoing events
    let (tx, mut rx) = mpsc::unbounded_channel::<Arc<ServerEvent>>();

    let conn_id = Uuid::new_v4();
    state.gateway.write().await.connect(conn_id, tx);
    tracing::info!("Connection {} opened", conn_id);

    // Spawn task for sending outgoing messages
    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let message = match event.to_ws_message() {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Failed to encode {} for {}: {}", event.name(), conn_id, e);
                    continue;
                }
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                handle_text_message(&state, conn_id, &text).await;
            }
            Ok(Message::Close(_)) => {
                tracing::info!("Connection {} sent close frame", conn_id);
                break;
            }
            Ok(_) => {
                // Ignore other message types (binary, ping, pong)
            }
            Err(e) => {
                let err = WhiteboardError::WebSocketError(e.to_string());
                tracing::warn!("Connection {}: {}", conn_id, err);
                break;
            }
        }
    }

    // Cleanup: leave the room and stop processing this connection
    state.gateway.write().await.disconnect(conn_id);
    send_task.abort();
    tracing::info!("Connection {} closed", conn_id);
}

/// Decode a text frame and apply it to the gateway
async fn handle_text_message(state: &AppState, conn_id: Uuid, text: &str) {
    let event = match ClientEvent::parse(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Unknown message from {}: {}", conn_id, e);
            return;
        }
    };

    let mut gateway = state.gateway.write().await;
    if let Err(e) = gateway.handle(conn_id, event) {
        if e.is_validation() {
            // Already reported to the client as joinError
            tracing::debug!("Event from {} rejected: {}", conn_id, e);
        } else {
            tracing::warn!("Event from {} failed: {}", conn_id, e);
        }
    }
}
