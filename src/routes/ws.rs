use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};

use crate::game::GameHub;
use crate::protocol::ClientMessage;
use crate::state::AppState;

/// Build the game channel route: `GET /ws`.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// `GET /ws`: Upgrade to the game `WebSocket`.
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_ws_connection(hub, socket))
}

/// Drive one player's connection from join to disconnect.
async fn handle_ws_connection(hub: GameHub, socket: WebSocket) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();

    // Registration queues the initial dungeon, identity and registry frames on `tx`
    let id = match hub.connect(tx).await {
        Ok(id) => id,
        Err(err) => {
            tracing::error!("Refusing connection: {err}");
            let _ = ws_sink.send(Message::Close(None)).await;
            return;
        }
    };

    // Spawn task to forward outbound messages to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sink.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Process inbound messages
    while let Some(Ok(msg)) = ws_stream.next().await {
        match msg {
            Message::Text(text) => match ClientMessage::parse(&text) {
                Some(ClientMessage::Movement(flags)) => hub.movement(id, flags).await,
                None => tracing::debug!(player = %id, "Ignoring malformed frame"),
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Cleanup on disconnect
    hub.disconnect(id).await;
    send_task.abort();
}
