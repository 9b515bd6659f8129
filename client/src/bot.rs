//! A headless player that walks toward the nearest item.

use crate::game::ClientWorld;
use crate::network::{ClientError, WorldClient};
use log::{debug, info};
use shared::{ClientEvent, Inventory, ServerEvent, Vec3};
use std::time::Duration;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Delay between two movement steps.
pub const STEP_INTERVAL: Duration = Duration::from_millis(16);
const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);
/// How far ahead the wander target is placed when no item is left.
const WANDER_REACH: f32 = 10.0;
/// Heading change after a blocked step, in radians.
const TURN_ON_BLOCK: f32 = 1.3;

#[derive(Debug, Clone, PartialEq)]
pub struct BotReport {
    pub moves_sent: u64,
    pub blocked_steps: u64,
    pub events_received: u64,
    pub items_collected: u64,
    pub position: Vec3,
    pub inventory: Inventory,
}

#[derive(Debug, Clone)]
pub struct Bot {
    pub world: ClientWorld,
    pub running: bool,
    heading: f32,
}

impl Bot {
    pub fn new(running: bool) -> Self {
        Self {
            world: ClientWorld::new(),
            running,
            heading: 0.0,
        }
    }

    /// Where to walk next: the nearest item, or a point ahead on the
    /// current heading once the map is bare.
    pub fn target(&self) -> (f32, f32) {
        match self.world.nearest_item() {
            Some(item) => (item.x, item.z),
            None => (
                self.world.position.x + self.heading.sin() * WANDER_REACH,
                self.world.position.z + self.heading.cos() * WANDER_REACH,
            ),
        }
    }

    /// Takes one step. Blocked steps turn the bot and, with no item to chase,
    /// send it off in a new direction.
    pub fn step(&mut self) -> Option<ClientEvent> {
        let (x, z) = self.target();
        if self.world.step_toward(x, z, self.running) {
            return Some(ClientEvent::PlayerMove(
                self.world.move_update(true, self.running),
            ));
        }

        self.heading += TURN_ON_BLOCK;
        let (sx, sz) = (self.heading.sin(), self.heading.cos());
        let sidestep = self.world.step_toward(
            self.world.position.x + sx,
            self.world.position.z + sz,
            self.running,
        );
        sidestep.then(|| ClientEvent::PlayerMove(self.world.move_update(true, self.running)))
    }
}

/// Plays for `duration`, reporting what happened. Returns early if the
/// server closes the connection.
pub async fn run_bot(
    client: &mut WorldClient,
    duration: Duration,
    running: bool,
) -> Result<BotReport, ClientError> {
    let mut bot = Bot::new(running);
    let mut report = BotReport {
        moves_sent: 0,
        blocked_steps: 0,
        events_received: 0,
        items_collected: 0,
        position: bot.world.position,
        inventory: Inventory::new(),
    };

    while bot.world.player_id.is_none() {
        match client.recv_timeout(SNAPSHOT_TIMEOUT).await? {
            Some(event) => {
                report.events_received += 1;
                bot.world.apply(event);
            }
            None => return Err(ClientError::Closed),
        }
    }
    info!(
        "Playing as {:?} with {} items in sight",
        bot.world.player_id,
        bot.world.items.len()
    );

    let deadline = Instant::now() + duration;
    let mut steps = interval(STEP_INTERVAL);
    steps.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => break,

            _ = steps.tick() => {
                match bot.step() {
                    Some(event) => {
                        client.send(&event).await?;
                        report.moves_sent += 1;
                    }
                    None => report.blocked_steps += 1,
                }
            }

            event = client.recv() => {
                let Some(event) = event? else {
                    debug!("Server closed the connection");
                    break;
                };
                report.events_received += 1;
                if let ServerEvent::ItemCollected { player_id, item_id, .. } = &event {
                    if bot.world.is_self(*player_id) {
                        info!("Collected {}", item_id);
                        report.items_collected += 1;
                    }
                }
                bot.world.apply(event);
            }
        }
    }

    report.position = bot.world.position;
    report.inventory = bot.world.inventory.clone();
    Ok(report)
}
