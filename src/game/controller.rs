//! Authoritative owner of the maze, the registry and the current round.
//!
//! Every transition returns a [`Dispatch`]: the outbound messages it produced, in the order
//! they must reach clients. The controller never talks to sockets itself.

use std::fmt;

use chrono::{DateTime, Utc};

use super::movement::{MovementFlags, attempt_move};
use super::registry::{Player, PlayerRegistry};
use super::round::SessionRound;
use super::{ConnectionId, GameError};
use crate::maze::{DungeonOptions, GenerationError, Maze, MazeGenerator};
use crate::protocol::{DungeonData, ServerMessage};
use crate::stats::{RoundSummary, StatsQueue};

/// Generation attempts before a failure is surfaced.
pub const GENERATION_ATTEMPTS: usize = 5;

/// One outbound message and who receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Deliver to a single connection.
    To(ConnectionId, ServerMessage),
    /// Deliver to every connected client.
    All(ServerMessage),
}

/// Ordered outbound messages produced by one transition.
pub type Dispatch = Vec<Outbound>;

pub struct SessionController {
    generator: Box<dyn MazeGenerator>,
    options: DungeonOptions,
    stats: StatsQueue,
    round: SessionRound,
    registry: PlayerRegistry,
    next_id: Option<u64>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("options", &self.options)
            .field("generation", &self.round.generation)
            .field("players", &self.registry.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Generate the first round and start with an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Generation`] if every generation attempt fails.
    pub fn new(
        generator: Box<dyn MazeGenerator>,
        options: DungeonOptions,
        stats: StatsQueue,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        let maze = generate_with_retries(generator.as_ref(), &options)?;
        Ok(Self {
            generator,
            options,
            stats,
            round: SessionRound::begin(maze, 1, 0, now),
            registry: PlayerRegistry::new(),
            next_id: Some(0),
        })
    }

    #[must_use]
    pub const fn round(&self) -> &SessionRound {
        &self.round
    }

    #[must_use]
    pub const fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// Register a new player at the start cell.
    ///
    /// The dispatch sends the maze and the new identity to that connection, then the full
    /// registry to everyone.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::IdentitiesExhausted`] once the identity counter has run out.
    pub fn on_player_connect(&mut self) -> Result<(ConnectionId, Dispatch), GameError> {
        let id = self
            .next_id
            .map(ConnectionId)
            .ok_or(GameError::IdentitiesExhausted)?;
        self.next_id = id.0.checked_add(1);

        self.registry.insert(id, Player::spawn(self.round.start));
        tracing::info!(player = %id, players = self.registry.len(), "Player connected");

        let dispatch = vec![
            Outbound::To(id, self.dungeon_message()),
            Outbound::To(id, ServerMessage::ConnectionId(id)),
            Outbound::All(self.players_message()),
        ];
        Ok((id, dispatch))
    }

    /// Drop a player. Unknown identities are ignored; the registry is re-broadcast either way.
    pub fn on_player_disconnect(&mut self, id: ConnectionId) -> Dispatch {
        if self.registry.remove(id).is_some() {
            tracing::info!(player = %id, players = self.registry.len(), "Player disconnected");
        } else {
            tracing::debug!(player = %id, "Disconnect for unregistered player");
        }
        vec![Outbound::All(self.players_message())]
    }

    /// Apply one movement message.
    ///
    /// The round completes whenever the player's resulting position is the end cell, whether
    /// or not the move was accepted: the summary is queued, a new maze is generated and every
    /// player is sent back to the new start cell.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPlayer`] if `id` is not registered.
    pub fn on_movement(
        &mut self,
        id: ConnectionId,
        flags: MovementFlags,
        now: DateTime<Utc>,
    ) -> Result<Dispatch, GameError> {
        let maze = &self.round.maze;
        let player = self
            .registry
            .get_mut(id)
            .ok_or(GameError::UnknownPlayer(id))?;

        if let Some(step) = attempt_move(maze, player.position, flags) {
            player.apply(step);
        }

        // A rejected move leaves the player where it stood, which may already be the goal
        if player.position != self.round.end {
            return Ok(vec![Outbound::All(self.players_message())]);
        }

        tracing::info!(player = %id, generation = self.round.generation, "Goal reached");
        self.complete_round(now);
        Ok(vec![
            Outbound::All(self.dungeon_message()),
            Outbound::All(self.players_message()),
        ])
    }

    fn complete_round(&mut self, now: DateTime<Utc>) {
        self.stats.submit(RoundSummary {
            player_count: self.registry.len(),
            elapsed_secs: self.round.elapsed_secs(now),
        });

        let players = self.registry.len();
        let generation = self.round.generation + 1;
        self.round = match generate_with_retries(self.generator.as_ref(), &self.options) {
            Ok(maze) => SessionRound::begin(maze, generation, players, now),
            Err(err) => {
                tracing::error!("Keeping the previous dungeon: {err}");
                self.round.replay(players, now)
            }
        };
        self.registry.reset_all(self.round.start);
    }

    fn dungeon_message(&self) -> ServerMessage {
        ServerMessage::DungeonData(DungeonData::from(&self.round))
    }

    fn players_message(&self) -> ServerMessage {
        ServerMessage::AllPlayers(self.registry.snapshot())
    }
}

fn generate_with_retries(
    generator: &dyn MazeGenerator,
    options: &DungeonOptions,
) -> Result<Maze, GameError> {
    let mut last_error = GenerationError::NoRooms;
    for attempt in 1..=GENERATION_ATTEMPTS {
        match generator.generate(options) {
            Ok(maze) => return Ok(maze),
            Err(err) => {
                tracing::warn!(attempt, "Dungeon generation failed: {err}");
                last_error = err;
            }
        }
    }
    Err(GameError::Generation(last_error))
}
