use clap::Parser;
use log::{error, info};
use server::{GameState, Server, ServerConfig};

/// Parses the command line, generates the world and serves it until the
/// listener task ends or Ctrl+C is received.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();

    let game_state = GameState::new(&config)?;
    let server = Server::bind(&config, game_state).await?;
    let handle = server.handle();

    let mut server_task = tokio::spawn(server.run());

    tokio::select! {
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => info!("Server stopped"),
                Ok(Err(e)) => error!("Server failed: {}", e),
                Err(e) => error!("Server task panicked: {}", e),
            }
            return Ok(());
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    handle.shutdown();
    if let Err(e) = server_task.await {
        error!("Server task panicked: {}", e);
    }

    Ok(())
}
