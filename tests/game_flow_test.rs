//! End-to-end game flow over real `WebSocket` connections.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeMap;

use dungeon_server::game::{ConnectionId, MovementFlags, PlayerView};
use dungeon_server::maze::Position;
use dungeon_server::protocol::{DungeonData, ServerMessage};

use common::{Client, DOWN, RIGHT};

async fn expect_dungeon(client: &mut Client) -> DungeonData {
    match common::next_message(client).await {
        ServerMessage::DungeonData(data) => data,
        other => unreachable!("expected dungeon data, got {other:?}"),
    }
}

async fn expect_id(client: &mut Client) -> ConnectionId {
    match common::next_message(client).await {
        ServerMessage::ConnectionId(id) => id,
        other => unreachable!("expected connectionID, got {other:?}"),
    }
}

async fn expect_players(client: &mut Client) -> BTreeMap<ConnectionId, PlayerView> {
    match common::next_message(client).await {
        ServerMessage::AllPlayers(players) => players,
        other => unreachable!("expected allPlayers, got {other:?}"),
    }
}

fn position_of(players: &BTreeMap<ConnectionId, PlayerView>, id: ConnectionId) -> Position {
    let view = players.get(&id).expect("player present");
    Position::new(view.x, view.y)
}

/// Connect a client and consume its three join frames.
async fn join(addr: std::net::SocketAddr) -> (Client, ConnectionId, DungeonData) {
    let mut client = common::connect(addr).await;
    let dungeon = expect_dungeon(&mut client).await;
    let id = expect_id(&mut client).await;
    let players = expect_players(&mut client).await;
    assert!(players.contains_key(&id));
    (client, id, dungeon)
}

#[tokio::test]
async fn two_players_play_a_full_round() {
    let addr = common::spawn_default_server().await;
    let start = Position::new(1, 1);

    // Player A joins first
    let mut a = common::connect(addr).await;
    let dungeon_a = expect_dungeon(&mut a).await;
    assert_eq!(expect_id(&mut a).await, ConnectionId(0));
    let players = expect_players(&mut a).await;
    assert_eq!(players.len(), 1);
    assert_eq!(position_of(&players, ConnectionId(0)), start);
    assert_eq!(dungeon_a.starting_point, start);
    assert_eq!(dungeon_a.ending_point, Position::new(5, 1));

    // Player B joins and sees the same maze; A is told about B
    let mut b = common::connect(addr).await;
    let dungeon_b = expect_dungeon(&mut b).await;
    assert_eq!(expect_id(&mut b).await, ConnectionId(1));
    assert_eq!(expect_players(&mut b).await.len(), 2);
    assert_eq!(dungeon_a, dungeon_b);
    assert_eq!(expect_players(&mut a).await.len(), 2);

    // Walking into a wall changes nothing, but everyone still hears about it
    common::send_movement(&mut a, DOWN).await;
    for client in [&mut a, &mut b] {
        let players = expect_players(client).await;
        assert_eq!(position_of(&players, ConnectionId(0)), start);
    }

    // Three steps along the corridor
    for x in 2..=4 {
        common::send_movement(&mut a, RIGHT).await;
        for client in [&mut a, &mut b] {
            let players = expect_players(client).await;
            assert_eq!(position_of(&players, ConnectionId(0)), Position::new(x, 1));
            assert_eq!(players[&ConnectionId(0)].shift_y, 196);
        }
    }

    // The fourth lands on the goal: a new dungeon, then everyone back at the start
    common::send_movement(&mut a, RIGHT).await;
    for client in [&mut a, &mut b] {
        let dungeon = expect_dungeon(client).await;
        assert_eq!(dungeon.starting_point, start);
        let players = expect_players(client).await;
        assert_eq!(position_of(&players, ConnectionId(0)), start);
        assert_eq!(position_of(&players, ConnectionId(1)), start);
    }
}

#[tokio::test]
async fn disconnect_is_broadcast_to_remaining_players() {
    let addr = common::spawn_default_server().await;
    let (mut a, a_id, _) = join(addr).await;
    let (mut b, b_id, _) = join(addr).await;
    assert_eq!(expect_players(&mut a).await.len(), 2);

    b.close(None).await.expect("close handshake");

    let players = expect_players(&mut a).await;
    assert!(players.contains_key(&a_id));
    assert!(!players.contains_key(&b_id));
}

#[tokio::test]
async fn identities_are_not_reused_after_disconnect() {
    let addr = common::spawn_default_server().await;
    let (mut a, a_id, _) = join(addr).await;
    a.close(None).await.expect("close handshake");

    let (_b, b_id, _) = join(addr).await;
    assert!(b_id > a_id);
}

#[tokio::test]
async fn malformed_frames_are_ignored() {
    let addr = common::spawn_default_server().await;
    let (mut a, a_id, _) = join(addr).await;

    common::send_text(&mut a, "definitely not json").await;
    common::send_text(&mut a, r#"{"type":"teleport","payload":{"x":5,"y":1}}"#).await;
    common::assert_silent(&mut a).await;

    common::send_movement(&mut a, RIGHT).await;
    let players = expect_players(&mut a).await;
    assert_eq!(position_of(&players, a_id), Position::new(2, 1));
}

#[tokio::test]
async fn simultaneous_flags_honour_left_first() {
    let addr = common::spawn_default_server().await;
    let (mut a, a_id, _) = join(addr).await;

    common::send_movement(&mut a, RIGHT).await;
    expect_players(&mut a).await;

    // From (2,1) both left and right are open; left wins
    let both = MovementFlags {
        left: true,
        right: true,
        ..MovementFlags::default()
    };
    common::send_movement(&mut a, both).await;
    let players = expect_players(&mut a).await;
    assert_eq!(position_of(&players, a_id), Position::new(1, 1));
    assert_eq!(players[&a_id].shift_y, 64);
}
