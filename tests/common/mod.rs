#![allow(dead_code)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use dungeon_server::config::Config;
use dungeon_server::game::{GameHub, MovementFlags, SessionController};
use dungeon_server::gateway::BroadcastGateway;
use dungeon_server::maze::{DungeonOptions, GenerationError, Maze, MazeGenerator, Room};
use dungeon_server::protocol::ServerMessage;
use dungeon_server::state::AppState;
use dungeon_server::stats::{LogSink, StatsQueue, StatsSink, spawn_recorder};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

//  x: 0 1 2 3 4 5 6
// y0: 0 1 0 0 0 0 0
// y1: 0 2 1 1 1 3 0
// y2: 0 0 0 0 0 0 0
//
// Start is room 2 at (1,1), the goal is room 3 at (5,1).
pub fn corridor_maze() -> Maze {
    Maze::from_rows(
        vec![
            vec![0, 1, 0, 0, 0, 0, 0],
            vec![0, 2, 1, 1, 1, 3, 0],
            vec![0, 0, 0, 0, 0, 0, 0],
        ],
        vec![Room::new(2, 1, 1, 1, 1), Room::new(3, 5, 1, 1, 1)],
        8,
    )
    .expect("valid grid")
}

/// Always produces [`corridor_maze`].
pub struct CorridorGenerator;

impl MazeGenerator for CorridorGenerator {
    fn generate(&self, _options: &DungeonOptions) -> Result<Maze, GenerationError> {
        Ok(corridor_maze())
    }
}

pub const RIGHT: MovementFlags = MovementFlags {
    up: false,
    down: false,
    left: false,
    right: true,
};

pub const DOWN: MovementFlags = MovementFlags {
    up: false,
    down: true,
    left: false,
    right: false,
};

/// Application state over the corridor maze, recording summaries into `sink`.
pub fn test_state(db: Option<DatabaseConnection>, sink: Arc<dyn StatsSink>) -> AppState {
    let config = Config::from_lookup(|_| None).expect("defaults are valid");
    let (stats, rx) = StatsQueue::new();
    spawn_recorder(sink, rx);

    let controller = SessionController::new(
        Box::new(CorridorGenerator),
        config.dungeon.clone(),
        stats,
        Utc::now(),
    )
    .expect("corridor generator never fails");

    AppState {
        db,
        config,
        hub: GameHub::new(controller, BroadcastGateway::new()),
    }
}

pub fn test_app(state: AppState) -> Router {
    dungeon_server::routes::router().with_state(state)
}

/// Serve `state` on an ephemeral local port.
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let app = test_app(state);
    tokio::spawn(async move { axum::serve(listener, app).await });
    addr
}

pub async fn spawn_default_server() -> SocketAddr {
    spawn_server(test_state(None, Arc::new(LogSink))).await
}

pub async fn connect(addr: SocketAddr) -> Client {
    let (client, _response) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket handshake");
    client
}

/// Next server frame, skipping control frames.
pub async fn next_message(client: &mut Client) -> ServerMessage {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("valid server frame");
        }
    }
}

/// Assert no frame arrives within a short window.
pub async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "unexpected frame: {result:?}");
}

pub async fn send_text(client: &mut Client, text: &str) {
    client
        .send(Message::Text(text.to_string().into()))
        .await
        .expect("send frame");
}

pub async fn send_movement(client: &mut Client, flags: MovementFlags) {
    let frame = serde_json::json!({ "type": "movement", "payload": flags });
    send_text(client, &frame.to_string()).await;
}

/// Test helper: send a GET request to the app and return (status, body).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap_or_default();

    let response = app.clone().oneshot(request).await.unwrap_or_default();

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let body_str = String::from_utf8(body.to_vec()).unwrap_or_default();

    (status, body_str)
}
