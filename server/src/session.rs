//! Session lifecycle and routing of inbound client events.
//!
//! One session exists per admitted connection and owns exactly one player in
//! the world. Sessions are created on admission, destroyed on disconnect,
//! and every inbound event is applied on behalf of the session that sent it.

use crate::broadcast::{dispatch, Recipients};
use crate::collection;
use crate::config::{FullInventoryPolicy, MovementPolicy};
use crate::world::World;
use log::{debug, info, warn};
use shared::{ClientEvent, Inventory, InventorySlot, MoveUpdate, PlayerId, ServerEvent, WireFormat};
use std::cell::Cell;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_tungstenite::tungstenite::Message;

/// Server-side handle for one connected client.
#[derive(Debug)]
pub struct Session {
    /// Identity of both the session and its player
    pub id: PlayerId,
    pub addr: SocketAddr,
    pub format: WireFormat,
    pub connected_at: Instant,
    /// Inbound events applied so far
    pub events_applied: u64,
    sender: mpsc::Sender<Message>,
    /// Set while the outbound queue is full, cleared by the next delivery.
    backlogged: Cell<bool>,
}

impl Session {
    pub fn new(
        id: PlayerId,
        addr: SocketAddr,
        format: WireFormat,
        sender: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            id,
            addr,
            format,
            connected_at: Instant::now(),
            events_applied: 0,
            sender,
            backlogged: Cell::new(false),
        }
    }

    /// Queues a frame for the connection's writer without waiting.
    pub fn try_send(&self, message: Message) -> Result<(), TrySendError<Message>> {
        let result = self.sender.try_send(message);
        match &result {
            Ok(()) => self.backlogged.set(false),
            Err(TrySendError::Full(_)) => self.backlogged.set(true),
            Err(TrySendError::Closed(_)) => {}
        }
        result
    }

    pub fn is_backlogged(&self) -> bool {
        self.backlogged.get()
    }
}

/// How an inbound event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// The payload failed validation and was dropped.
    Malformed,
    /// A well-formed move refused by the movement policy.
    Rejected,
    /// The sender has no player, typically an event racing its disconnect.
    UnknownPlayer,
}

pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    next_session_id: u32,
    max_sessions: usize,
    full_inventory: FullInventoryPolicy,
    movement: MovementPolicy,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
            max_sessions,
            full_inventory: FullInventoryPolicy::default(),
            movement: MovementPolicy::default(),
        }
    }

    pub fn with_policies(mut self, full_inventory: FullInventoryPolicy, movement: MovementPolicy) -> Self {
        self.full_inventory = full_inventory;
        self.movement = movement;
        self
    }

    /// Registers a session. Returns `None` when at capacity.
    pub fn add_session(
        &mut self,
        addr: SocketAddr,
        format: WireFormat,
        sender: mpsc::Sender<Message>,
    ) -> Option<PlayerId> {
        if self.sessions.len() >= self.max_sessions {
            warn!("Refusing {}: {} sessions already open", addr, self.sessions.len());
            return None;
        }

        let id = PlayerId(self.next_session_id);
        self.next_session_id += 1;

        info!("Session {} opened from {} ({:?})", id, addr, format);
        self.sessions.insert(id, Session::new(id, addr, format, sender));
        Some(id)
    }

    pub fn remove_session(&mut self, id: PlayerId) -> Option<Session> {
        let session = self.sessions.remove(&id)?;
        info!(
            "Session {} closed after {:.1}s, {} events",
            id,
            session.connected_at.elapsed().as_secs_f32(),
            session.events_applied
        );
        Some(session)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.sessions.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Admits a connection: registers the session, spawns its player and
    /// sends it a full snapshot. A session whose snapshot could not be
    /// queued is rolled back and refused.
    pub fn connect(
        &mut self,
        world: &mut World,
        addr: SocketAddr,
        format: WireFormat,
        sender: mpsc::Sender<Message>,
    ) -> Option<PlayerId> {
        let id = self.add_session(addr, format, sender)?;
        world.add_player(id);

        let report = dispatch(self, Recipients::One(id), &world.snapshot_for(id));
        if report.delivered == 0 {
            warn!("Snapshot for {} was not delivered, refusing session", id);
            world.remove_player(id);
            self.remove_session(id);
            return None;
        }
        Some(id)
    }

    /// Tears down a session and announces the departure to everyone left.
    /// Returns false, and announces nothing, if the session was already gone.
    pub fn disconnect(&mut self, world: &mut World, id: PlayerId) -> bool {
        if self.remove_session(id).is_none() {
            debug!("Ignoring disconnect for unknown {}", id);
            return false;
        }

        world.remove_player(id);
        dispatch(
            self,
            Recipients::All,
            &ServerEvent::PlayerDisconnected { player_id: id },
        );
        true
    }

    pub fn handle_event(&mut self, world: &mut World, id: PlayerId, event: ClientEvent) -> EventOutcome {
        let outcome = match event {
            ClientEvent::PlayerMove(update) => self.handle_move(world, id, update),
            ClientEvent::InventoryUpdate { inventory } => {
                self.handle_inventory_replace(world, id, inventory)
            }
        };

        match outcome {
            EventOutcome::Applied => {
                if let Some(session) = self.sessions.get_mut(&id) {
                    session.events_applied += 1;
                }
            }
            EventOutcome::Malformed => debug!("Dropped malformed event from {}", id),
            EventOutcome::Rejected => debug!("Rejected out-of-bounds move from {}", id),
            EventOutcome::UnknownPlayer => debug!("Dropped event for unknown {}", id),
        }
        outcome
    }

    /// Stores the reported position verbatim, resolves pickups, then relays
    /// the move to every other session.
    fn handle_move(&mut self, world: &mut World, id: PlayerId, update: MoveUpdate) -> EventOutcome {
        if !update.is_well_formed() {
            return EventOutcome::Malformed;
        }
        if self.movement == MovementPolicy::Bounded
            && !world.contains(update.position.x, update.position.z)
        {
            return EventOutcome::Rejected;
        }

        let Some(player) = world.player_mut(id) else {
            return EventOutcome::UnknownPlayer;
        };
        player.apply_move(&update);

        for pickup in collection::resolve(world, id, self.full_inventory) {
            info!("{} collected {}", id, pickup.item_id);
            dispatch(self, Recipients::All, &pickup.into_event());
        }

        dispatch(
            self,
            Recipients::AllExcept(id),
            &ServerEvent::PlayerUpdate {
                player_id: id,
                position: update.position,
                rotation: update.rotation,
                is_moving: update.is_moving,
                running: update.running,
            },
        );
        EventOutcome::Applied
    }

    /// Overwrites the stored inventory with the client's copy. This path
    /// does not go through collection and is not broadcast.
    fn handle_inventory_replace(
        &mut self,
        world: &mut World,
        id: PlayerId,
        slots: Vec<Option<InventorySlot>>,
    ) -> EventOutcome {
        let Ok(inventory) = Inventory::try_from(slots) else {
            return EventOutcome::Malformed;
        };

        match world.player_mut(id) {
            Some(player) => {
                player.inventory = inventory;
                EventOutcome::Applied
            }
            None => EventOutcome::UnknownPlayer,
        }
    }
}
