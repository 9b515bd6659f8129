use crate::broadcast::{dispatch, DispatchReport, Recipients};
use crate::config::ServerConfig;
use crate::error::GenerationError;
use crate::generator;
use crate::npc;
use crate::session::{EventOutcome, SessionManager};
use crate::world::World;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{ClientEvent, PlayerId, ServerEvent, WireFormat};
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Everything the main loop owns: the world, the sessions watching it and
/// the random source driving NPCs.
pub struct GameState {
    pub world: World,
    pub sessions: SessionManager,
    rng: StdRng,
    pub tick: u64,
}

impl GameState {
    /// Generates a fresh world. With a seed, generation and every later NPC
    /// decision are reproducible.
    pub fn new(config: &ServerConfig) -> Result<Self, GenerationError> {
        let mut rng = match config.seed {
            Some(seed) => {
                info!("Using world seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        };

        let world = generator::generate(&config.world, &mut rng)?;
        let sessions = SessionManager::new(config.max_clients)
            .with_policies(config.full_inventory, config.movement);

        Ok(Self::from_parts(world, sessions, rng))
    }

    pub fn from_parts(world: World, sessions: SessionManager, rng: StdRng) -> Self {
        Self {
            world,
            sessions,
            rng,
            tick: 0,
        }
    }

    pub fn admit(
        &mut self,
        addr: SocketAddr,
        format: WireFormat,
        sender: mpsc::Sender<Message>,
    ) -> Option<PlayerId> {
        self.sessions.connect(&mut self.world, addr, format, sender)
    }

    pub fn handle_event(&mut self, player_id: PlayerId, event: ClientEvent) -> EventOutcome {
        self.sessions.handle_event(&mut self.world, player_id, event)
    }

    pub fn disconnect(&mut self, player_id: PlayerId) -> bool {
        self.sessions.disconnect(&mut self.world, player_id)
    }

    /// Advances every NPC one step and pushes their positions to all
    /// sessions. Nothing is encoded while nobody is connected.
    pub fn tick(&mut self) -> DispatchReport {
        npc::simulate_tick(&mut self.world.npcs, &mut self.rng, self.world.boundary);
        self.tick += 1;

        if self.sessions.is_empty() {
            return DispatchReport::default();
        }

        let update = ServerEvent::NpcsUpdate {
            tick: self.tick,
            npcs: self.world.npc_states(),
        };
        dispatch(&self.sessions, Recipients::All, &update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use shared::codec::decode_text;

    fn addr() -> SocketAddr {
        "127.0.0.1:7000".parse().unwrap()
    }

    fn seeded_config(seed: u64) -> ServerConfig {
        ServerConfig {
            seed: Some(seed),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_new_generates_world() {
        let state = GameState::new(&seeded_config(3)).unwrap();
        assert_eq!(state.tick, 0);
        assert_eq!(state.world.items.len(), 30);
        assert_eq!(state.world.npcs.len(), 8);
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_generation_failure_is_reported() {
        let config = ServerConfig {
            world: WorldConfig {
                placement_attempts: 0,
                ..WorldConfig::default()
            },
            ..seeded_config(3)
        };
        assert!(GameState::new(&config).is_err());
    }

    #[test]
    fn test_seeded_states_tick_identically() {
        let mut a = GameState::new(&seeded_config(21)).unwrap();
        let mut b = GameState::new(&seeded_config(21)).unwrap();

        for _ in 0..500 {
            a.tick();
            b.tick();
        }

        assert_eq!(a.world.npcs, b.world.npcs);
        assert_eq!(a.tick, 500);
    }

    #[test]
    fn test_tick_without_sessions_sends_nothing() {
        let mut state = GameState::new(&seeded_config(4)).unwrap();
        let before: Vec<_> = state.world.npcs.iter().map(|n| n.wander_timer).collect();

        assert_eq!(state.tick(), DispatchReport::default());

        let after: Vec<_> = state.world.npcs.iter().map(|n| n.wander_timer).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_tick_broadcasts_npc_positions() {
        let mut state = GameState::new(&seeded_config(5)).unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let id = state.admit(addr(), WireFormat::Json, tx).unwrap();
        let _snapshot = rx.try_recv().unwrap();

        let report = state.tick();
        assert_eq!(report.delivered, 1);

        let Message::Text(text) = rx.try_recv().unwrap() else {
            panic!("expected a text frame");
        };
        match decode_text::<ServerEvent>(&text).unwrap() {
            ServerEvent::NpcsUpdate { tick, npcs } => {
                assert_eq!(tick, 1);
                assert_eq!(npcs, state.world.npc_states());
            }
            other => panic!("unexpected event {:?}", other),
        }

        assert!(state.disconnect(id));
        assert!(!state.disconnect(id));
    }
}
