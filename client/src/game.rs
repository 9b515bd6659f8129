//! Client-side mirror of the world, rebuilt from server events.
//!
//! The mirror is only as fresh as the last event applied. Positions of the
//! local player are owned here and reported to the server, which stores
//! them as given; everything else is taken from the server verbatim.

use shared::{
    blocked_by, planar_distance, Inventory, ItemId, ItemState, MoveUpdate, NpcState,
    ObstacleState, PlayerId, PlayerState, Rotation, ServerEvent, Vec3, MAP_BOUNDARY,
    MOVE_SPEED, RUN_MULTIPLIER, SPAWN_HEIGHT,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ClientWorld {
    /// Set by the first snapshot.
    pub player_id: Option<PlayerId>,
    pub position: Vec3,
    pub rotation: Rotation,
    pub inventory: Inventory,
    pub obstacles: Vec<ObstacleState>,
    /// Items still lying in the world.
    pub items: HashMap<ItemId, ItemState>,
    pub npcs: Vec<NpcState>,
    pub others: HashMap<PlayerId, PlayerState>,
    pub npc_tick: u64,
}

impl Default for ClientWorld {
    fn default() -> Self {
        Self {
            player_id: None,
            position: Vec3::new(0.0, SPAWN_HEIGHT, 0.0),
            rotation: Rotation::default(),
            inventory: Inventory::new(),
            obstacles: Vec::new(),
            items: HashMap::new(),
            npcs: Vec::new(),
            others: HashMap::new(),
            npc_tick: 0,
        }
    }
}

impl ClientWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_self(&self, id: PlayerId) -> bool {
        self.player_id == Some(id)
    }

    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::GameState {
                player_id,
                items,
                npcs,
                obstacles,
                players,
            } => {
                self.player_id = Some(player_id);
                self.items = items
                    .into_iter()
                    .filter(|item| !item.collected)
                    .map(|item| (item.id, item))
                    .collect();
                self.npcs = npcs;
                self.obstacles = obstacles;
                self.others.clear();

                for player in players {
                    if player.id == player_id {
                        self.position = player.position;
                        self.rotation = player.rotation;
                        self.inventory = player.inventory;
                    } else {
                        self.others.insert(player.id, player);
                    }
                }
            }

            ServerEvent::PlayerUpdate {
                player_id,
                position,
                rotation,
                is_moving,
                running,
            } => {
                if self.is_self(player_id) {
                    return;
                }
                let player = self.others.entry(player_id).or_insert_with(|| PlayerState {
                    id: player_id,
                    position,
                    rotation,
                    is_moving,
                    running,
                    inventory: Inventory::new(),
                });
                player.position = position;
                player.rotation = rotation;
                player.is_moving = is_moving;
                player.running = running;
            }

            ServerEvent::PlayerDisconnected { player_id } => {
                self.others.remove(&player_id);
            }

            ServerEvent::ItemCollected {
                item_id,
                player_id,
                inventory,
            } => {
                self.items.remove(&item_id);
                if self.is_self(player_id) {
                    self.inventory = inventory;
                } else if let Some(player) = self.others.get_mut(&player_id) {
                    player.inventory = inventory;
                }
            }

            ServerEvent::NpcsUpdate { tick, npcs } => {
                self.npc_tick = tick;
                self.npcs = npcs;
            }
        }
    }

    pub fn nearest_item(&self) -> Option<&ItemState> {
        self.items.values().min_by(|a, b| {
            let da = planar_distance(self.position.x, self.position.z, a.x, a.z);
            let db = planar_distance(self.position.x, self.position.z, b.x, b.z);
            da.total_cmp(&db)
        })
    }

    /// True if a player may stand at (x, z).
    pub fn can_stand_at(&self, x: f32, z: f32) -> bool {
        x.abs() < MAP_BOUNDARY
            && z.abs() < MAP_BOUNDARY
            && !self.obstacles.iter().any(|obstacle| blocked_by(x, z, obstacle))
    }

    /// Moves by (dx, dz). The map edge is checked per axis, so a step
    /// into it slides along the edge; an obstacle's clearance blocks both
    /// axes. Returns whether the player moved at all.
    pub fn try_step(&mut self, dx: f32, dz: f32) -> bool {
        let moved_x = dx != 0.0 && (self.position.x + dx).abs() < MAP_BOUNDARY;
        let moved_z = dz != 0.0 && (self.position.z + dz).abs() < MAP_BOUNDARY;
        let x = if moved_x { self.position.x + dx } else { self.position.x };
        let z = if moved_z { self.position.z + dz } else { self.position.z };

        if !(moved_x || moved_z) || self.obstacles.iter().any(|obstacle| blocked_by(x, z, obstacle)) {
            return false;
        }
        self.position.x = x;
        self.position.z = z;
        true
    }

    /// One fixed-length step toward (x, z), facing the direction of travel.
    pub fn step_toward(&mut self, x: f32, z: f32, running: bool) -> bool {
        let dx = x - self.position.x;
        let dz = z - self.position.z;
        let distance = (dx * dx + dz * dz).sqrt();
        if distance <= f32::EPSILON {
            return false;
        }

        let speed = if running {
            MOVE_SPEED * RUN_MULTIPLIER
        } else {
            MOVE_SPEED
        };
        let length = speed.min(distance);

        self.rotation.yaw = dx.atan2(dz);
        self.try_step(dx / distance * length, dz / distance * length)
    }

    pub fn move_update(&self, is_moving: bool, running: bool) -> MoveUpdate {
        MoveUpdate {
            position: self.position,
            rotation: self.rotation,
            is_moving,
            running,
        }
    }
}
