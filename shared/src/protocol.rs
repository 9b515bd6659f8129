//! Events exchanged over a session's channel.
//!
//! Both enums are externally tagged by event name, so the JSON form of a
//! move is `{"playerMove": {...}}` and the same enums round-trip through the
//! binary codec unchanged.

use crate::inventory::{Inventory, InventorySlot};
use crate::items::ItemKind;
use crate::{ItemId, NpcId, PlayerId, Rotation, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub position: Vec3,
    pub rotation: Rotation,
    pub is_moving: bool,
    pub running: bool,
    pub inventory: Inventory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemState {
    pub id: ItemId,
    pub kind: ItemKind,
    pub x: f32,
    pub z: f32,
    pub collected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcState {
    pub id: NpcId,
    pub x: f32,
    pub z: f32,
    pub target_x: f32,
    pub target_z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleState {
    pub x: f32,
    pub z: f32,
    pub radius: f32,
}

/// Payload of a client movement report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveUpdate {
    pub position: Vec3,
    pub rotation: Rotation,
    pub is_moving: bool,
    pub running: bool,
}

impl MoveUpdate {
    /// Shape check only: every coordinate must be a finite number.
    pub fn is_well_formed(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Full world snapshot, sent once to a newly admitted session.
    GameState {
        player_id: PlayerId,
        items: Vec<ItemState>,
        npcs: Vec<NpcState>,
        obstacles: Vec<ObstacleState>,
        players: Vec<PlayerState>,
    },
    PlayerUpdate {
        player_id: PlayerId,
        position: Vec3,
        rotation: Rotation,
        is_moving: bool,
        running: bool,
    },
    PlayerDisconnected {
        player_id: PlayerId,
    },
    ItemCollected {
        item_id: ItemId,
        player_id: PlayerId,
        inventory: Inventory,
    },
    NpcsUpdate {
        tick: u64,
        npcs: Vec<NpcState>,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::GameState { .. } => "gameState",
            ServerEvent::PlayerUpdate { .. } => "playerUpdate",
            ServerEvent::PlayerDisconnected { .. } => "playerDisconnected",
            ServerEvent::ItemCollected { .. } => "itemCollected",
            ServerEvent::NpcsUpdate { .. } => "npcsUpdate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    PlayerMove(MoveUpdate),
    /// Replaces the sender's stored inventory wholesale.
    InventoryUpdate {
        inventory: Vec<Option<InventorySlot>>,
    },
}
