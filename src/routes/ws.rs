//! WebSocket upgrade + message loop. One connection drives one workspace.
//!
//! The loop waits on two things at once: the next client frame, and the next
//! backend completion from tasks the workspace spawned. Either may produce
//! any number of outgoing JSON messages.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, error, info, instrument};

use crate::logic::Workspace;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "console_host", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "console_host", "WebSocket connected");
  let (tx, mut rx) = unbounded_channel();
  let mut workspace = Workspace::new(state.as_ref().clone(), tx);

  loop {
    let replies = tokio::select! {
      frame = socket.recv() => match frame {
        Some(Ok(Message::Text(txt))) => match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "console_host", frame_len = txt.len(), "WS message received");
            workspace.handle(incoming)
          }
          Err(e) => vec![ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) }],
        },
        Some(Ok(Message::Ping(payload))) => {
          let _ = socket.send(Message::Pong(payload)).await;
          continue;
        }
        Some(Ok(Message::Close(_))) | None => break,
        Some(Ok(_)) => continue,
        Some(Err(e)) => {
          debug!(target: "console_host", error = %e, "WS receive error");
          break;
        }
      },
      // The workspace holds a sender, so this never yields None while the loop runs.
      Some(completion) = rx.recv() => workspace.apply(completion),
    };

    if !send_all(&mut socket, replies).await {
      break;
    }
  }
  info!(target: "console_host", slug = ?workspace.slug(), "WebSocket disconnected");
}

async fn send_all(socket: &mut WebSocket, replies: Vec<ServerWsMessage>) -> bool {
  for reply in replies {
    let out = serde_json::to_string(&reply).unwrap_or_else(|e| {
      serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
    });
    if let Err(e) = socket.send(Message::Text(out)).await {
      error!(target: "console_host", error = %e, "WS send error");
      return false;
    }
  }
  true
}
