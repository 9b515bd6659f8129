//! Types shared by the world server and its clients: world constants, the
//! item catalogue, the inventory stacking rule and the wire protocol.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod codec;
pub mod inventory;
pub mod items;
pub mod protocol;

pub use codec::{CodecError, Frame, WireFormat};
pub use inventory::{Inventory, InventoryError, InventorySlot, INVENTORY_SLOTS, MAX_STACK};
pub use items::ItemKind;
pub use protocol::{
    ClientEvent, ItemState, MoveUpdate, NpcState, ObstacleState, PlayerState, ServerEvent,
};

/// Half-width of the square map; nothing may stand at or beyond it.
pub const MAP_BOUNDARY: f32 = 95.0;
/// Half-width of the square used for random placement during generation.
pub const SPAWN_EXTENT: f32 = 90.0;
/// Height at which players stand on flat ground.
pub const SPAWN_HEIGHT: f32 = 1.1;
/// Planar distance under which a player picks up an item.
pub const PICKUP_RADIUS: f32 = 1.5;
/// Extra clearance the client keeps between a player and an obstacle edge.
pub const PLAYER_CLEARANCE: f32 = 0.5;
pub const MOVE_SPEED: f32 = 0.12;
pub const RUN_MULTIPLIER: f32 = 1.8;
pub const TICK_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NpcId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

impl fmt::Display for NpcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "npc-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite()
    }
}

/// Distance on the ground plane; height is ignored for every proximity rule.
pub fn planar_distance(ax: f32, az: f32, bx: f32, bz: f32) -> f32 {
    let dx = ax - bx;
    let dz = az - bz;
    (dx * dx + dz * dz).sqrt()
}

/// Returns true if a body at (x, z) overlaps an obstacle once the player
/// clearance is added to the obstacle radius.
pub fn blocked_by(x: f32, z: f32, obstacle: &ObstacleState) -> bool {
    planar_distance(x, z, obstacle.x, obstacle.z) < obstacle.radius + PLAYER_CLEARANCE
}
