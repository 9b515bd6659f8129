//! Command-line configuration for the world server.

use clap::{Args, Parser, ValueEnum};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TICK_RATE: u32 = 20;
pub const DEFAULT_MAX_CLIENTS: usize = 64;
pub const DEFAULT_VEGETATION: usize = 50;
pub const DEFAULT_TERRAIN: usize = 30;
pub const DEFAULT_ITEMS: usize = 30;
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 10_000;
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;

/// What happens to an item touched by a player whose inventory cannot take it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FullInventoryPolicy {
    /// The item is flagged collected and granted to nobody.
    #[default]
    Consume,
    /// The item stays in the world for someone else.
    Keep,
}

/// How much the server trusts client-reported positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MovementPolicy {
    /// Positions are stored verbatim.
    #[default]
    Trusted,
    /// Positions at or beyond the map boundary are dropped.
    Bounded,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct WorldConfig {
    /// Number of small vegetation obstacles
    #[arg(long = "vegetation", default_value_t = DEFAULT_VEGETATION)]
    pub vegetation_count: usize,
    /// Number of variable-radius terrain obstacles
    #[arg(long = "terrain", default_value_t = DEFAULT_TERRAIN)]
    pub terrain_count: usize,
    /// Number of collectible items
    #[arg(long = "items", default_value_t = DEFAULT_ITEMS)]
    pub item_count: usize,
    /// Retry ceiling for placing a single item clear of obstacles
    #[arg(long, default_value_t = DEFAULT_PLACEMENT_ATTEMPTS)]
    pub placement_attempts: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            vegetation_count: DEFAULT_VEGETATION,
            terrain_count: DEFAULT_TERRAIN,
            item_count: DEFAULT_ITEMS,
            placement_attempts: DEFAULT_PLACEMENT_ATTEMPTS,
        }
    }
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// NPC simulation ticks per second
    #[arg(short, long, default_value_t = DEFAULT_TICK_RATE,
          value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub tick_rate: u32,
    /// Maximum number of concurrent sessions
    #[arg(long, default_value_t = DEFAULT_MAX_CLIENTS)]
    pub max_clients: usize,
    /// Seed for world generation and NPC wandering
    #[arg(long)]
    pub seed: Option<u64>,
    #[command(flatten)]
    pub world: WorldConfig,
    /// Fate of items touched by a player with a full inventory
    #[arg(long, value_enum, default_value_t = FullInventoryPolicy::Consume)]
    pub full_inventory: FullInventoryPolicy,
    /// Trust level for client-reported positions
    #[arg(long, value_enum, default_value_t = MovementPolicy::Trusted)]
    pub movement: MovementPolicy,
    /// Frames queued per session before new ones are dropped
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_BUFFER)]
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            tick_rate: DEFAULT_TICK_RATE,
            max_clients: DEFAULT_MAX_CLIENTS,
            seed: None,
            world: WorldConfig::default(),
            full_inventory: FullInventoryPolicy::default(),
            movement: MovementPolicy::default(),
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Per-session queue capacity; a zero-capacity channel is not allowed.
    pub fn outbound_capacity(&self) -> usize {
        self.outbound_buffer.max(1)
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate.max(1)))
    }
}
