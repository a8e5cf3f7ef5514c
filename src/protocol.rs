//! JSON wire protocol.
//!
//! Every frame is `{"type": <name>, "payload": <payload>}` in both directions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::{ConnectionId, MovementFlags, PlayerView, SessionRound};
use crate::maze::{Maze, Position};

/// Maze snapshot with its start and goal cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonData {
    pub dungeon: Arc<Maze>,
    pub starting_point: Position,
    pub ending_point: Position,
}

impl From<&SessionRound> for DungeonData {
    fn from(round: &SessionRound) -> Self {
        Self {
            dungeon: Arc::clone(&round.maze),
            starting_point: round.start,
            ending_point: round.end,
        }
    }
}

/// Messages pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    #[serde(rename = "dungeon data")]
    DungeonData(DungeonData),
    #[serde(rename = "connectionID")]
    ConnectionId(ConnectionId),
    #[serde(rename = "allPlayers")]
    AllPlayers(BTreeMap<ConnectionId, PlayerView>),
}

impl ServerMessage {
    /// Wire name of this message.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DungeonData(_) => "dungeon data",
            Self::ConnectionId(_) => "connectionID",
            Self::AllPlayers(_) => "allPlayers",
        }
    }
}

/// Messages sent by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    #[serde(rename = "movement")]
    Movement(MovementFlags),
}

impl ClientMessage {
    /// Parse an inbound text frame. Malformed and unknown frames yield `None`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}
