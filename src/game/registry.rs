//! Connected players and their positions.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::ConnectionId;
use super::movement::{Facing, Step};
use crate::maze::Position;

/// In-maze state of one connected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub position: Position,
    pub facing: Facing,
}

impl Player {
    /// A freshly spawned player facing down.
    #[must_use]
    pub fn spawn(position: Position) -> Self {
        Self {
            position,
            facing: Facing::default(),
        }
    }

    pub fn apply(&mut self, step: Step) {
        self.position = step.position;
        self.facing = step.direction.into();
    }
}

/// Wire form of a player inside an `allPlayers` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub x: u32,
    pub y: u32,
    pub shift_y: u32,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            x: player.position.x,
            y: player.position.y,
            shift_y: player.facing.shift_y(),
        }
    }
}

/// Mapping from connection identity to player. Keys are exactly the connected players.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: HashMap<ConnectionId, Player>,
}

impl PlayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ConnectionId, player: Player) {
        self.players.insert(id, player);
    }

    /// Remove a player, returning it if it was registered.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Player> {
        self.players.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: ConnectionId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnectionId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.players.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Move every registered player to `position`. Facings are kept.
    pub fn reset_all(&mut self, position: Position) {
        for player in self.players.values_mut() {
            player.position = position;
        }
    }

    /// Ordered snapshot for broadcast; identical state always yields an identical snapshot.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<ConnectionId, PlayerView> {
        self.players
            .iter()
            .map(|(id, player)| (*id, PlayerView::from(player)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::movement::Direction;

    fn registry_with(ids: &[u64]) -> PlayerRegistry {
        let mut registry = PlayerRegistry::new();
        for (offset, id) in ids.iter().enumerate() {
            let x = u32::try_from(offset).unwrap_or(0);
            registry.insert(ConnectionId(*id), Player::spawn(Position::new(x, 1)));
        }
        registry
    }

    #[test]
    fn test_remove_only_touches_one_key() {
        let mut registry = registry_with(&[0, 1, 2]);
        let before = registry.snapshot();

        assert!(registry.remove(ConnectionId(1)).is_some());
        let after = registry.snapshot();
        assert_eq!(after.len(), 2);
        assert!(!after.contains_key(&ConnectionId(1)));
        assert_eq!(after.get(&ConnectionId(0)), before.get(&ConnectionId(0)));
        assert_eq!(after.get(&ConnectionId(2)), before.get(&ConnectionId(2)));

        assert!(registry.remove(ConnectionId(1)).is_none());
        assert_eq!(registry.snapshot(), after);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let registry = registry_with(&[5, 3, 9]);
        let first = serde_json::to_string(&registry.snapshot()).unwrap_or_default();
        let second = serde_json::to_string(&registry.snapshot()).unwrap_or_default();
        assert_eq!(first, second);
        assert!(first.starts_with(r#"{"3":"#));
    }

    #[test]
    fn test_apply_step_updates_facing() {
        let mut player = Player::spawn(Position::new(1, 1));
        assert_eq!(PlayerView::from(&player).shift_y, 128);
        player.apply(Step {
            position: Position::new(0, 1),
            direction: Direction::Left,
        });
        let view = PlayerView::from(&player);
        assert_eq!((view.x, view.y, view.shift_y), (0, 1, 64));
    }

    #[test]
    fn test_reset_all() {
        let mut registry = registry_with(&[0, 1]);
        registry.reset_all(Position::new(4, 4));
        assert!(
            registry
                .snapshot()
                .values()
                .all(|view| (view.x, view.y) == (4, 4))
        );
    }

    #[test]
    fn test_view_wire_shape() {
        let view = PlayerView::from(&Player::spawn(Position::new(2, 3)));
        let json = serde_json::to_value(view).unwrap_or_default();
        assert_eq!(json, serde_json::json!({ "x": 2, "y": 3, "shiftY": 128 }));
    }
}
