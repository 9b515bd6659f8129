//! # World Server Library
//!
//! This library provides the authoritative server for a shared exploration
//! world. It generates the world once at startup, keeps every connected
//! client's view of it consistent, resolves item pickups, and walks a small
//! population of NPCs around the map on a fixed tick.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative World
//! The server owns the canonical positions of obstacles, items, NPCs and
//! players. Clients report where their player went; the server stores that,
//! decides which items were picked up, and tells everyone else.
//!
//! ### Session Lifecycle
//! Each WebSocket connection is one session with exactly one player:
//! - Admission spawns the player at the origin and sends a full snapshot
//! - Movement is relayed to every other session
//! - Disconnection removes the player and notifies the rest exactly once
//!
//! ### Item Collection
//! Every accepted move is followed by a pickup scan around the player. An
//! item can be collected once per process lifetime, and the result is
//! announced to every session including the collector.
//!
//! ## Architecture Design
//!
//! ### Single Owner Event Loop
//! All world state is owned by one task that processes client events and
//! NPC ticks one at a time. Connection tasks never touch the world; they
//! only decode frames and forward events, so no locking is needed and two
//! players racing for one item are resolved by arrival order.
//!
//! ### Best-Effort Fan-Out
//! Outbound events are encoded once per wire format and pushed onto bounded
//! per-session queues without waiting. A slow client loses frames instead
//! of stalling the loop for everyone.
//!
//! ## Module Organization
//!
//! - `world`: the world model and full snapshots
//! - `generator`: one-shot procedural placement of obstacles, items, NPCs
//! - `npc`: per-tick wandering
//! - `session`: session registry and routing of inbound events
//! - `collection`: pickup resolution
//! - `broadcast`: recipient selection and frame fan-out
//! - `game`: the state owned by the main loop
//! - `network`: WebSocket accept loop, connection tasks, the main loop
//! - `config`, `error`: command-line configuration and error types
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::{GameState, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         seed: Some(7),
//!         ..ServerConfig::default()
//!     };
//!
//!     // Generation fails only if items cannot be placed clear of obstacles
//!     let game_state = GameState::new(&config)?;
//!     let server = Server::bind(&config, game_state).await?;
//!
//!     // Runs until a shutdown is requested through `server.handle()`
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod collection;
pub mod config;
pub mod error;
pub mod game;
pub mod generator;
pub mod network;
pub mod npc;
pub mod session;
pub mod world;

pub use config::{FullInventoryPolicy, MovementPolicy, ServerConfig, WorldConfig};
pub use error::{GenerationError, ServerError};
pub use game::GameState;
pub use network::{Server, ServerHandle};
