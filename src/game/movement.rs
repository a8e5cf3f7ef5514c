//! Movement validation against the current maze.

use serde::{Deserialize, Serialize};

use crate::maze::{Maze, Position};

/// Direction flags sent by a client. Absent flags count as not pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementFlags {
    /// The pressed directions in evaluation order: left, up, right, down.
    pub fn pressed(self) -> impl Iterator<Item = Direction> {
        Direction::PRIORITY
            .into_iter()
            .filter(move |direction| match direction {
                Direction::Left => self.left,
                Direction::Up => self.up,
                Direction::Right => self.right,
                Direction::Down => self.down,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// Tie-break order when several flags are set at once.
    pub const PRIORITY: [Self; 4] = [Self::Left, Self::Up, Self::Right, Self::Down];

    /// The neighbouring cell, or `None` when it would leave the grid on the low side.
    #[must_use]
    pub fn step(self, from: Position) -> Option<Position> {
        match self {
            Self::Left => from.x.checked_sub(1).map(|x| Position::new(x, from.y)),
            Self::Up => from.y.checked_sub(1).map(|y| Position::new(from.x, y)),
            Self::Right => from.x.checked_add(1).map(|x| Position::new(x, from.y)),
            Self::Down => from.y.checked_add(1).map(|y| Position::new(from.x, y)),
        }
    }
}

/// Which way a player sprite faces. Presentation only: selects the sprite sheet row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Up,
    Left,
    #[default]
    Down,
    Right,
}

impl Facing {
    /// Vertical offset of this facing's row in the client sprite sheet.
    #[must_use]
    pub const fn shift_y(self) -> u32 {
        match self {
            Self::Up => 0,
            Self::Left => 64,
            Self::Down => 128,
            Self::Right => 196,
        }
    }
}

impl From<Direction> for Facing {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => Self::Left,
            Direction::Up => Self::Up,
            Direction::Right => Self::Right,
            Direction::Down => Self::Down,
        }
    }
}

/// An accepted one-cell move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub position: Position,
    pub direction: Direction,
}

/// Resolve one movement message.
///
/// The first pressed direction (left, up, right, down) whose target cell is in bounds and
/// passable wins. Returns `None` when no pressed direction is valid.
#[must_use]
pub fn attempt_move(maze: &Maze, from: Position, flags: MovementFlags) -> Option<Step> {
    flags.pressed().find_map(|direction| {
        direction
            .step(from)
            .filter(|target| maze.is_passable(*target))
            .map(|position| Step {
                position,
                direction,
            })
    })
}
