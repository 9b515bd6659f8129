//! Wandering NPCs, advanced once per scheduler tick.
//!
//! Steps are a fixed distance per tick rather than scaled by elapsed time,
//! so changing the tick rate changes how fast NPCs appear to walk. NPCs do
//! not avoid obstacles or each other.

use rand::Rng;
use shared::{NpcId, NpcState};
use std::f32::consts::TAU;

pub const SPEED_RANGE: (f32, f32) = (0.02, 0.05);
pub const INITIAL_TIMER_MAX: f32 = 200.0;
pub const RETARGET_TIMER_RANGE: (f32, f32) = (100.0, 300.0);
pub const WANDER_DISTANCE_RANGE: (f32, f32) = (10.0, 30.0);
/// Distance at which an NPC considers its target reached.
pub const ARRIVAL_THRESHOLD: f32 = 0.5;
/// Targets are kept this far inside the map boundary.
pub const EDGE_MARGIN: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Npc {
    pub id: NpcId,
    pub x: f32,
    pub z: f32,
    pub target_x: f32,
    pub target_z: f32,
    /// Units travelled per tick.
    pub speed: f32,
    /// Ticks left before a new wander target is picked.
    pub wander_timer: f32,
}

impl Npc {
    pub fn spawn<R: Rng + ?Sized>(id: NpcId, x: f32, z: f32, rng: &mut R) -> Self {
        Self {
            id,
            x,
            z,
            target_x: x,
            target_z: z,
            speed: rng.gen_range(SPEED_RANGE.0..=SPEED_RANGE.1),
            wander_timer: rng.gen_range(0.0..INITIAL_TIMER_MAX),
        }
    }

    /// Advances this NPC by one tick. Returns true if a new target was picked.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, boundary: f32) -> bool {
        self.wander_timer -= 1.0;

        let retargeted = self.wander_timer <= 0.0;
        if retargeted {
            self.retarget(rng, boundary);
        }

        self.step();
        retargeted
    }

    /// Picks a target at a random heading and distance from the current
    /// position, clamped to stay [`EDGE_MARGIN`] inside the boundary, and
    /// restarts the wander timer.
    pub fn retarget<R: Rng + ?Sized>(&mut self, rng: &mut R, boundary: f32) {
        let angle = rng.gen_range(0.0..TAU);
        let distance = rng.gen_range(WANDER_DISTANCE_RANGE.0..WANDER_DISTANCE_RANGE.1);
        let limit = boundary - EDGE_MARGIN;

        self.target_x = (self.x + angle.cos() * distance).clamp(-limit, limit);
        self.target_z = (self.z + angle.sin() * distance).clamp(-limit, limit);
        self.wander_timer = rng.gen_range(RETARGET_TIMER_RANGE.0..RETARGET_TIMER_RANGE.1);
    }

    /// Moves `speed` units toward the target unless already within
    /// [`ARRIVAL_THRESHOLD`] of it.
    pub fn step(&mut self) {
        let dx = self.target_x - self.x;
        let dz = self.target_z - self.z;
        let distance = (dx * dx + dz * dz).sqrt();

        if distance > ARRIVAL_THRESHOLD {
            self.x += dx / distance * self.speed;
            self.z += dz / distance * self.speed;
        }
    }

    pub fn to_state(&self) -> NpcState {
        NpcState {
            id: self.id,
            x: self.x,
            z: self.z,
            target_x: self.target_x,
            target_z: self.target_z,
        }
    }
}

/// Runs one simulation tick over every NPC. Returns how many retargeted.
pub fn simulate_tick<R: Rng + ?Sized>(npcs: &mut [Npc], rng: &mut R, boundary: f32) -> usize {
    npcs.iter_mut()
        .map(|npc| npc.update(rng, boundary))
        .filter(|retargeted| *retargeted)
        .count()
}
