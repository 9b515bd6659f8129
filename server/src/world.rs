//! The authoritative world model: obstacles, items, NPCs and players.
//!
//! The model has no behavior of its own beyond bookkeeping. Everything that
//! mutates it runs on the server's main loop, so a `&mut World` is the only
//! synchronization any caller needs.

use crate::npc::Npc;
use log::info;
use shared::{
    Inventory, ItemId, ItemKind, ItemState, MoveUpdate, NpcState, PlayerId,
    PlayerState, Rotation, ServerEvent, Vec3, MAP_BOUNDARY, SPAWN_HEIGHT,
};
use std::collections::HashMap;

pub use shared::ObstacleState as Obstacle;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub position: Vec3,
    pub rotation: Rotation,
    pub is_moving: bool,
    pub running: bool,
    pub inventory: Inventory,
}

impl Player {
    /// A fresh player standing at the map origin with nothing in hand.
    pub fn spawn(id: PlayerId) -> Self {
        Self {
            id,
            position: Vec3::new(0.0, SPAWN_HEIGHT, 0.0),
            rotation: Rotation::default(),
            is_moving: false,
            running: false,
            inventory: Inventory::new(),
        }
    }

    pub fn apply_move(&mut self, update: &MoveUpdate) {
        self.position = update.position;
        self.rotation = update.rotation;
        self.is_moving = update.is_moving;
        self.running = update.running;
    }

    pub fn to_state(&self) -> PlayerState {
        PlayerState {
            id: self.id,
            position: self.position,
            rotation: self.rotation,
            is_moving: self.is_moving,
            running: self.running,
            inventory: self.inventory.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub x: f32,
    pub z: f32,
    /// Once set the item is inert for the rest of the process lifetime.
    pub collected: bool,
}

impl Item {
    pub fn to_state(&self) -> ItemState {
        ItemState {
            id: self.id,
            kind: self.kind,
            x: self.x,
            z: self.z,
            collected: self.collected,
        }
    }
}

#[derive(Debug, Clone)]
pub struct World {
    pub boundary: f32,
    pub obstacles: Vec<Obstacle>,
    pub items: Vec<Item>,
    pub npcs: Vec<Npc>,
    pub(crate) players: HashMap<PlayerId, Player>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(MAP_BOUNDARY)
    }
}

impl World {
    pub fn new(boundary: f32) -> Self {
        Self {
            boundary,
            obstacles: Vec::new(),
            items: Vec::new(),
            npcs: Vec::new(),
            players: HashMap::new(),
        }
    }

    pub fn add_player(&mut self, id: PlayerId) -> &Player {
        let player = Player::spawn(id);
        info!(
            "Added {} at ({}, {}, {})",
            id, player.position.x, player.position.y, player.position.z
        );
        self.players.entry(id).or_insert(player)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id);
        if removed.is_some() {
            info!("Removed {}", id);
        }
        removed
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn remaining_items(&self) -> usize {
        self.items.iter().filter(|item| !item.collected).count()
    }

    /// True when (x, z) lies strictly inside the map boundary.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x.abs() < self.boundary && z.abs() < self.boundary
    }

    pub fn player_states(&self) -> Vec<PlayerState> {
        let mut players: Vec<PlayerState> = self.players.values().map(Player::to_state).collect();
        players.sort_by_key(|player| player.id);
        players
    }

    pub fn npc_states(&self) -> Vec<NpcState> {
        self.npcs.iter().map(Npc::to_state).collect()
    }

    /// Full snapshot addressed to `recipient`. Collected items are left out.
    pub fn snapshot_for(&self, recipient: PlayerId) -> ServerEvent {
        ServerEvent::GameState {
            player_id: recipient,
            items: self
                .items
                .iter()
                .filter(|item| !item.collected)
                .map(Item::to_state)
                .collect(),
            npcs: self.npc_states(),
            obstacles: self.obstacles.clone(),
            players: self.player_states(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, collected: bool) -> Item {
        Item {
            id: ItemId(id),
            kind: ItemKind::Food,
            x: id as f32,
            z: 0.0,
            collected,
        }
    }

    #[test]
    fn test_player_spawns_at_origin() {
        let mut world = World::default();
        let player = world.add_player(PlayerId(1)).clone();

        assert_eq!(player.position, Vec3::new(0.0, SPAWN_HEIGHT, 0.0));
        assert_eq!(player.rotation, Rotation::default());
        assert!(player.inventory.is_empty());
        assert_eq!(world.player_count(), 1);
    }

    #[test]
    fn test_remove_unknown_player_is_noop() {
        let mut world = World::default();
        world.add_player(PlayerId(1));

        assert!(world.remove_player(PlayerId(2)).is_none());
        assert!(world.remove_player(PlayerId(1)).is_some());
        assert!(world.remove_player(PlayerId(1)).is_none());
        assert_eq!(world.player_count(), 0);
    }

    #[test]
    fn test_apply_move_overwrites_verbatim() {
        let mut player = Player::spawn(PlayerId(3));
        let update = MoveUpdate {
            position: Vec3::new(500.0, -4.0, 12.0),
            rotation: Rotation {
                yaw: 3.0,
                pitch: 0.25,
            },
            is_moving: true,
            running: true,
        };

        player.apply_move(&update);

        assert_eq!(player.position, update.position);
        assert_eq!(player.rotation, update.rotation);
        assert!(player.is_moving);
        assert!(player.running);
    }

    #[test]
    fn test_snapshot_skips_collected_items() {
        let mut world = World::default();
        world.items = vec![item(0, false), item(1, true), item(2, false)];
        world.obstacles.push(Obstacle {
            x: 5.0,
            z: 5.0,
            radius: 1.0,
        });
        world.add_player(PlayerId(2));
        world.add_player(PlayerId(1));

        match world.snapshot_for(PlayerId(2)) {
            ServerEvent::GameState {
                player_id,
                items,
                obstacles,
                players,
                ..
            } => {
                assert_eq!(player_id, PlayerId(2));
                let ids: Vec<_> = items.iter().map(|i| i.id).collect();
                assert_eq!(ids, vec![ItemId(0), ItemId(2)]);
                assert_eq!(obstacles.len(), 1);
                let player_ids: Vec<_> = players.iter().map(|p| p.id).collect();
                assert_eq!(player_ids, vec![PlayerId(1), PlayerId(2)]);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(world.remaining_items(), 2);
    }

    #[test]
    fn test_contains_is_strict() {
        let world = World::default();
        assert!(world.contains(94.9, -94.9));
        assert!(!world.contains(95.0, 0.0));
        assert!(!world.contains(0.0, -120.0));
    }
}
