//! Server-authoritative game state: who is connected, where they stand, and what happens when
//! someone reaches the goal.

pub mod controller;
pub mod hub;
pub mod movement;
pub mod registry;
pub mod round;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::maze::GenerationError;

pub use controller::{Dispatch, Outbound, SessionController};
pub use hub::{GameHub, HubStatus};
pub use movement::{Direction, Facing, MovementFlags, Step, attempt_move};
pub use registry::{Player, PlayerRegistry, PlayerView};
pub use round::SessionRound;

/// Server-assigned identity of one connection.
///
/// Allocated from a strictly increasing counter and never reused while the process lives.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// A message referenced an identity that is not registered.
    UnknownPlayer(ConnectionId),
    /// The maze generator failed on every attempt.
    Generation(GenerationError),
    /// Every connection identity has been handed out.
    IdentitiesExhausted,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPlayer(id) => write!(f, "Unknown player: {id}"),
            Self::Generation(err) => write!(f, "Dungeon generation failed: {err}"),
            Self::IdentitiesExhausted => write!(f, "Connection identities exhausted"),
        }
    }
}

impl std::error::Error for GameError {}

impl From<GenerationError> for GameError {
    fn from(err: GenerationError) -> Self {
        Self::Generation(err)
    }
}
