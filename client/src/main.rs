use clap::{Parser, ValueEnum};
use client::{run_bot, WorldClient};
use log::info;
use shared::WireFormat;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Binary,
}

impl From<Format> for WireFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => WireFormat::Json,
            Format::Binary => WireFormat::Binary,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:5000")]
    server: String,

    /// Wire format for this connection
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Seconds to play before disconnecting
    #[arg(short = 'd', long, default_value_t = 30)]
    duration: u64,

    /// Move at running speed
    #[arg(short = 'r', long)]
    run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Starting client...");
    let mut client = WorldClient::connect(&args.server, args.format.into()).await?;

    let report = run_bot(&mut client, Duration::from_secs(args.duration), args.run).await?;
    info!(
        "Sent {} moves ({} blocked), received {} events, collected {} items",
        report.moves_sent, report.blocked_steps, report.events_received, report.items_collected
    );
    info!(
        "Finished at ({:.1}, {:.1}) holding {} stacks",
        report.position.x,
        report.position.z,
        report.inventory.occupied()
    );
    for slot in report.inventory.slots().iter().flatten() {
        info!("  {} {} x{}", slot.kind.glyph(), slot.kind.display_name(), slot.count);
    }

    client.close().await?;
    Ok(())
}
