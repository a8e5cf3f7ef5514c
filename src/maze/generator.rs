//! Procedural dungeon generation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Cell, DungeonOptions, FIRST_ROOM_ID, Maze, Room};

/// Smallest side length a room can have.
const MIN_ROOM_SIDE: u32 = 2;

/// Smallest grid that fits one room plus its enclosing wall.
const MIN_DIMENSION: u32 = MIN_ROOM_SIDE + 2;

/// Placement attempts per requested room before giving up on it.
const PLACEMENT_ATTEMPTS: u32 = 50;

/// Errors raised while generating a dungeon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The options cannot describe a playable dungeon.
    InvalidOptions(String),
    /// Not a single room fit into the grid.
    NoRooms,
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOptions(msg) => write!(f, "Invalid dungeon options: {msg}"),
            Self::NoRooms => write!(f, "No rooms could be placed"),
        }
    }
}

impl std::error::Error for GenerationError {}

/// Produces a fresh [`Maze`] for every round.
pub trait MazeGenerator: Send + Sync {
    /// Generate a dungeon from `options`.
    ///
    /// Implementations may place fewer rooms than requested.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] when no playable dungeon can be produced.
    fn generate(&self, options: &DungeonOptions) -> Result<Maze, GenerationError>;
}

/// Scatters rectangular rooms over a walled grid and chains them together with L-shaped
/// corridors, so every open cell is reachable from every other.
#[derive(Debug, Default)]
pub struct RoomsAndCorridors {
    seed: Option<u64>,
    calls: AtomicU64,
}

impl RoomsAndCorridors {
    /// A generator drawing from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A reproducible generator. Successive calls still yield different dungeons.
    #[must_use]
    pub const fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            calls: AtomicU64::new(0),
        }
    }

    fn rng(&self) -> StdRng {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        self.seed.map_or_else(StdRng::from_entropy, |seed| {
            StdRng::seed_from_u64(seed.wrapping_add(call))
        })
    }
}

impl MazeGenerator for RoomsAndCorridors {
    fn generate(&self, options: &DungeonOptions) -> Result<Maze, GenerationError> {
        validate(options)?;

        let mut rng = self.rng();
        let width = options.width;
        let height = options.height;
        let max_side = (options.average_room_size / 2 + 1).max(MIN_ROOM_SIDE);

        let mut cells = vec![vec![Cell::Wall; width as usize]; height as usize];
        let mut rooms: Vec<Room> = Vec::new();
        let mut next_id = FIRST_ROOM_ID;

        for _ in 0..options.room_count.saturating_mul(PLACEMENT_ATTEMPTS) {
            if rooms.len() as u64 >= u64::from(options.room_count) {
                break;
            }

            let room_w = rng.gen_range(MIN_ROOM_SIDE..=max_side);
            let room_h = rng.gen_range(MIN_ROOM_SIDE..=max_side);
            if room_w + 2 > width || room_h + 2 > height {
                continue;
            }

            let x = rng.gen_range(1..=width - room_w - 1);
            let y = rng.gen_range(1..=height - room_h - 1);
            let room = Room::new(next_id, x, y, room_w, room_h);
            if rooms.iter().any(|placed| placed.overlaps(&room, 1)) {
                continue;
            }

            carve_room(&mut cells, &room);
            if let Some(previous) = rooms.last() {
                carve_corridor(&mut cells, previous, &room, rng.gen_bool(0.5));
            }

            next_id += 1;
            rooms.push(room);
        }

        if rooms.is_empty() {
            return Err(GenerationError::NoRooms);
        }

        tracing::debug!(
            rooms = rooms.len(),
            requested = options.room_count,
            "Dungeon generated"
        );

        Maze::from_cells(cells, rooms, options.average_room_size, next_id)
            .map_err(|err| GenerationError::InvalidOptions(err.to_string()))
    }
}

fn validate(options: &DungeonOptions) -> Result<(), GenerationError> {
    if options.room_count == 0 || options.average_room_size == 0 {
        return Err(GenerationError::InvalidOptions(
            "room count and average room size must be positive".to_string(),
        ));
    }
    if options.width < MIN_DIMENSION || options.height < MIN_DIMENSION {
        return Err(GenerationError::InvalidOptions(format!(
            "dungeon must be at least {MIN_DIMENSION}x{MIN_DIMENSION}, got {}x{}",
            options.width, options.height
        )));
    }
    Ok(())
}

fn carve_room(cells: &mut [Vec<Cell>], room: &Room) {
    for y in room.y..room.y + room.h {
        for x in room.x..room.x + room.w {
            cells[y as usize][x as usize] = Cell::Room(room.id);
        }
    }
}

/// Join two room centres, walking horizontally first when `horizontal_first` is set.
fn carve_corridor(cells: &mut [Vec<Cell>], from: &Room, to: &Room, horizontal_first: bool) {
    if horizontal_first {
        carve_row(cells, from.cx, to.cx, from.cy);
        carve_column(cells, from.cy, to.cy, to.cx);
    } else {
        carve_column(cells, from.cy, to.cy, from.cx);
        carve_row(cells, from.cx, to.cx, to.cy);
    }
}

fn carve_row(cells: &mut [Vec<Cell>], x0: u32, x1: u32, y: u32) {
    for x in x0.min(x1)..=x0.max(x1) {
        open(cells, x, y);
    }
}

fn carve_column(cells: &mut [Vec<Cell>], y0: u32, y1: u32, x: u32) {
    for y in y0.min(y1)..=y0.max(y1) {
        open(cells, x, y);
    }
}

// Corridors never overwrite room cells.
fn open(cells: &mut [Vec<Cell>], x: u32, y: u32) {
    let cell = &mut cells[y as usize][x as usize];
    if *cell == Cell::Wall {
        *cell = Cell::Corridor;
    }
}
