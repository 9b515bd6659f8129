//! # World Client Library
//!
//! This library provides a headless client for the world server. It speaks
//! the same protocol as a graphical client would, which makes it useful for
//! load testing, integration tests and poking at a running server.
//!
//! ## Architecture Overview
//!
//! ### Server Authority
//! The server decides who collected what and where NPCs are. The client
//! owns only its own position, which it reports after every step; the
//! movement rules below are enforced here, not on the server.
//!
//! ### Movement Rules
//! A step is 0.12 units (1.8 times that when running). A step is refused
//! when it would leave the map or bring the player within the obstacle's
//! radius plus 0.5 of any obstacle centre.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! One WebSocket connection per client, in either wire format:
//! - Event encoding and decoding through the shared codec
//! - Timed receives for tests and scripted sessions
//! - Access to the server's close frame when a session is refused
//!
//! ### Game Module (`game`)
//! A local mirror of the world rebuilt from server events, plus the
//! client-side movement checks.
//!
//! ### Bot Module (`bot`)
//! A player that walks toward the nearest item every 16 ms and reports
//! what it saw.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::{run_bot, WorldClient};
//! use shared::WireFormat;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = WorldClient::connect("ws://127.0.0.1:5000", WireFormat::Json).await?;
//!     let report = run_bot(&mut client, Duration::from_secs(10), false).await?;
//!     println!("collected {} items", report.items_collected);
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod game;
pub mod network;

pub use bot::{run_bot, Bot, BotReport};
pub use game::ClientWorld;
pub use network::{ClientError, WorldClient};
