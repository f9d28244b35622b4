//! WebSocket bridge from the pipeline event bus to clients.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection: forward every pipeline event as
/// a JSON text frame until the client disconnects.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.pipeline().subscribe();

    info!("event stream client connected");

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            debug!("event stream send failed, client disconnected");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("failed to serialize pipeline event: {}", e);
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("event stream client lagged, skipped {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("event bus closed");
                    break;
                }
            }
        }
    });

    // Drain client frames; we only care about close.
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("event stream client requested close");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("event stream receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    info!("event stream client disconnected");
}
