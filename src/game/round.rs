use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::maze::{Maze, Position};

/// One maze's lifetime, from generation to the next goal-triggered regeneration.
#[derive(Debug, Clone)]
pub struct SessionRound {
    pub maze: Arc<Maze>,
    pub start: Position,
    pub end: Position,
    pub started_at: DateTime<Utc>,
    /// Starts at 1 and increases by one with every new round.
    pub generation: u64,
    pub players_at_start: usize,
}

impl SessionRound {
    #[must_use]
    pub fn begin(maze: Maze, generation: u64, players: usize, now: DateTime<Utc>) -> Self {
        let start = maze.start_cell();
        let end = maze.end_cell();
        tracing::info!(
            generation,
            players,
            %start,
            %end,
            rooms = maze.rooms().len(),
            "Round started"
        );
        Self {
            maze: Arc::new(maze),
            start,
            end,
            started_at: now,
            generation,
            players_at_start: players,
        }
    }

    /// The same maze played again as a fresh round.
    #[must_use]
    pub fn replay(&self, players: usize, now: DateTime<Utc>) -> Self {
        Self {
            maze: Arc::clone(&self.maze),
            start: self.start,
            end: self.end,
            started_at: now,
            generation: self.generation + 1,
            players_at_start: players,
        }
    }

    /// Whole seconds since the round began, truncated. Clock skew yields zero.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0)
    }
}
