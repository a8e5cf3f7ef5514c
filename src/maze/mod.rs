//! Dungeon grid model.
//!
//! A [`Maze`] is built once per round and never mutated afterwards; it is shared between the
//! controller and outbound snapshots as an `Arc<Maze>`.

pub mod generator;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use generator::{GenerationError, MazeGenerator, RoomsAndCorridors};

/// Room id the start cell is anchored to.
pub const START_ROOM_ID: u32 = 2;

/// Lowest id a room can carry. `0` and `1` encode walls and corridors on the wire.
pub const FIRST_ROOM_ID: u32 = 2;

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum Cell {
    Wall,
    Corridor,
    Room(u32),
}

impl Cell {
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }
}

impl From<Cell> for u32 {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Wall => 0,
            Cell::Corridor => 1,
            Cell::Room(id) => id,
        }
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Wall,
            1 => Self::Corridor,
            id => Self::Room(id),
        }
    }
}

/// A grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A rectangular room inside the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub cx: u32,
    pub cy: u32,
}

impl Room {
    /// Build a room and derive its centre cell.
    #[must_use]
    pub const fn new(id: u32, x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            id,
            x,
            y,
            w,
            h,
            cx: x + w / 2,
            cy: y + h / 2,
        }
    }

    #[must_use]
    pub const fn center(&self) -> Position {
        Position::new(self.cx, self.cy)
    }

    /// Whether this room, grown by `margin` cells on every side, overlaps `other`.
    #[must_use]
    pub const fn overlaps(&self, other: &Self, margin: u32) -> bool {
        self.x < other.x + other.w + margin
            && other.x < self.x + self.w + margin
            && self.y < other.y + other.h + margin
            && other.y < self.y + self.h + margin
    }
}

/// Parameters handed to a [`MazeGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonOptions {
    pub width: u32,
    pub height: u32,
    pub room_count: u32,
    pub average_room_size: u32,
}

impl Default for DungeonOptions {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            room_count: 7,
            average_room_size: 8,
        }
    }
}

/// Errors raised by the maze model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// No room with the requested id exists in this maze.
    RoomNotFound(u32),
    /// The supplied grid is empty or not rectangular.
    InvalidGrid(String),
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomNotFound(id) => write!(f, "Room {id} not found"),
            Self::InvalidGrid(msg) => write!(f, "Invalid grid: {msg}"),
        }
    }
}

impl std::error::Error for MazeError {}

/// The dungeon for one round.
///
/// Serializes to the client wire shape `{maze, w, h, rooms, roomSize}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MazeWire")]
pub struct Maze {
    #[serde(rename = "maze")]
    cells: Vec<Vec<Cell>>,
    #[serde(rename = "w")]
    width: u32,
    #[serde(rename = "h")]
    height: u32,
    rooms: Vec<Room>,
    #[serde(rename = "roomSize")]
    room_size: u32,
    #[serde(skip)]
    last_room_id: u32,
}

/// Inbound wire shape; the room index is rebuilt on conversion.
#[derive(Deserialize)]
struct MazeWire {
    maze: Vec<Vec<Cell>>,
    rooms: Vec<Room>,
    #[serde(rename = "roomSize")]
    room_size: u32,
}

impl TryFrom<MazeWire> for Maze {
    type Error = MazeError;

    fn try_from(wire: MazeWire) -> Result<Self, Self::Error> {
        let last_room_id = next_room_id(&wire.rooms);
        Self::from_cells(wire.maze, wire.rooms, wire.room_size, last_room_id)
    }
}

fn next_room_id(rooms: &[Room]) -> u32 {
    rooms
        .iter()
        .map(|room| room.id + 1)
        .max()
        .unwrap_or(FIRST_ROOM_ID)
}

impl Maze {
    /// Build a maze from row-major wire integers (`0` wall, `1` corridor, `>= 2` room id).
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::InvalidGrid`] if the grid is empty or its rows differ in length.
    pub fn from_rows(
        rows: Vec<Vec<u32>>,
        rooms: Vec<Room>,
        room_size: u32,
    ) -> Result<Self, MazeError> {
        let cells: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::from).collect())
            .collect();
        let last_room_id = next_room_id(&rooms);
        Self::from_cells(cells, rooms, room_size, last_room_id)
    }

    pub(crate) fn from_cells(
        cells: Vec<Vec<Cell>>,
        rooms: Vec<Room>,
        room_size: u32,
        last_room_id: u32,
    ) -> Result<Self, MazeError> {
        let height = u32::try_from(cells.len())
            .map_err(|_| MazeError::InvalidGrid("too many rows".to_string()))?;
        let width = cells.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(MazeError::InvalidGrid("grid is empty".to_string()));
        }
        if let Some(row) = cells.iter().position(|row| row.len() != width) {
            return Err(MazeError::InvalidGrid(format!(
                "row {row} has {} cells, expected {width}",
                cells[row].len()
            )));
        }
        let width = u32::try_from(width)
            .map_err(|_| MazeError::InvalidGrid("too many columns".to_string()))?;

        Ok(Self {
            cells,
            width,
            height,
            rooms,
            room_size,
            last_room_id,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub const fn room_size(&self) -> u32 {
        self.room_size
    }

    /// The id the generator would have assigned to the next room.
    #[must_use]
    pub const fn last_room_id(&self) -> u32 {
        self.last_room_id
    }

    /// The cell at `position`, or `None` when out of bounds.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<Cell> {
        self.cells
            .get(position.y as usize)
            .and_then(|row| row.get(position.x as usize))
            .copied()
    }

    /// True iff `position` is in bounds and not a wall.
    #[must_use]
    pub fn is_passable(&self, position: Position) -> bool {
        self.cell(position).is_some_and(Cell::is_passable)
    }

    /// Centre cell of the room with `room_id`.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::RoomNotFound`] when no such room was generated.
    pub fn center_of(&self, room_id: u32) -> Result<Position, MazeError> {
        self.rooms
            .iter()
            .find(|room| room.id == room_id)
            .map(Room::center)
            .ok_or(MazeError::RoomNotFound(room_id))
    }

    /// Where every player spawns: the centre of room [`START_ROOM_ID`].
    #[must_use]
    pub fn start_cell(&self) -> Position {
        self.center_or_origin(START_ROOM_ID)
    }

    /// The goal: the centre of room `last_room_id - 1`.
    #[must_use]
    pub fn end_cell(&self) -> Position {
        self.center_or_origin(self.last_room_id.saturating_sub(1))
    }

    fn center_or_origin(&self, room_id: u32) -> Position {
        self.center_of(room_id).unwrap_or_else(|err| {
            tracing::warn!(room_id, error = %err, "Falling back to origin");
            Position::default()
        })
    }
}
