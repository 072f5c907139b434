//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::Command,
    infrastructure::PusherChannel,
    ui::state::AppState,
};

pub async fn socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = state.connections.add(tx.clone()).await;
    tracing::info!("Connection {} opened", connection_id);

    let mut push_task = pusher_loop(rx, sender);

    let state_for_recv = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_text(&state_for_recv, &tx, text.as_str()).await,
                Message::Binary(data) => {
                    tracing::debug!("Ignoring {} bytes of binary data", data.len());
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} sent close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut push_task => recv_task.abort(),
        _ = &mut recv_task => push_task.abort(),
    }

    state.connections.remove(&connection_id).await;
    tracing::info!("Connection {} closed", connection_id);
}

/// Process one text frame from a socket.
///
/// `reply` pushes to the socket the frame came from.
pub async fn handle_text(state: &AppState, reply: &PusherChannel, text: &str) {
    tracing::info!("Received message: {}", text);

    match Command::parse(text) {
        Ok(Some(Command::Increment(target))) => {
            let snapshot = {
                let mut counter = state.counter.lock().await;
                let count = counter.increment(target);
                tracing::info!("Count incremented for target {}: {}", target, count);
                counter.snapshot()
            };

            match serde_json::to_string(&snapshot) {
                Ok(json) => {
                    let delivered = state.connections.broadcast(&json).await;
                    tracing::debug!("Broadcasted counts to {} connections", delivered);
                }
                Err(e) => tracing::error!("Failed to marshal counts: {}", e),
            }
        }
        Ok(None) => {
            if state.echo && reply.send(text.to_string()).is_err() {
                tracing::warn!("Failed to echo message");
            }
        }
        Err(e) => tracing::warn!("Ignoring command: {}", e),
    }
}
