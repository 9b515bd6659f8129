//! WebSocket transport and the fixed-rate main loop.
//!
//! Connection tasks only move frames. They decode inbound frames into
//! [`ClientEvent`]s and hand them to the main loop over a channel, and they
//! drain a per-session queue of already-encoded outbound frames. All world
//! state lives on the main loop, which interleaves those events with NPC
//! ticks.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::game::GameState;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{codec, ClientEvent, PlayerId, WireFormat};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};

const STATS_INTERVAL_TICKS: u64 = 100;

/// Messages sent from connection tasks to the main loop
#[derive(Debug)]
pub enum ServerMessage {
    Connected {
        addr: SocketAddr,
        format: WireFormat,
        sender: mpsc::Sender<Message>,
        /// Answered with the new player's id, or `None` when full.
        reply: oneshot::Sender<Option<PlayerId>>,
    },
    ClientEvent {
        player_id: PlayerId,
        event: ClientEvent,
    },
    Disconnected {
        player_id: PlayerId,
    },
    Shutdown,
}

/// Cloneable handle for stopping a running server.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    server_tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ServerHandle {
    /// Asks the main loop to stop. Returns false if it already has.
    pub fn shutdown(&self) -> bool {
        self.server_tx.send(ServerMessage::Shutdown).is_ok()
    }
}

pub struct Server {
    listener: TcpListener,
    game_state: GameState,
    tick_duration: Duration,
    outbound_capacity: usize,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn bind(config: &ServerConfig, game_state: GameState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.address()).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            game_state,
            tick_duration: config.tick_duration(),
            outbound_capacity: config.outbound_capacity(),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            server_tx: self.server_tx.clone(),
        }
    }

    /// Main server loop. Returns once a shutdown is requested.
    pub async fn run(self) -> Result<(), ServerError> {
        let Server {
            listener,
            mut game_state,
            tick_duration,
            outbound_capacity,
            server_tx,
            mut server_rx,
        } = self;

        let acceptor = tokio::spawn(accept_loop(listener, server_tx, outbound_capacity));

        let mut tick_interval = interval(tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut dropped_frames = 0usize;

        info!("Server started, ticking every {:?}", tick_duration);

        loop {
            tokio::select! {
                message = server_rx.recv() => {
                    match message {
                        Some(ServerMessage::Connected { addr, format, sender, reply }) => {
                            let admitted = game_state.admit(addr, format, sender);
                            if reply.send(admitted).is_err() {
                                // The connection died while waiting for an answer.
                                if let Some(player_id) = admitted {
                                    game_state.disconnect(player_id);
                                }
                            }
                        }
                        Some(ServerMessage::ClientEvent { player_id, event }) => {
                            game_state.handle_event(player_id, event);
                        }
                        Some(ServerMessage::Disconnected { player_id }) => {
                            game_state.disconnect(player_id);
                        }
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                }

                _ = tick_interval.tick() => {
                    dropped_frames += game_state.tick().dropped;

                    if game_state.tick % STATS_INTERVAL_TICKS == 0 {
                        debug!(
                            "Tick {}: {} sessions, {} items left, {} frames dropped",
                            game_state.tick,
                            game_state.sessions.len(),
                            game_state.world.remaining_items(),
                            dropped_frames
                        );
                    }
                }
            }
        }

        acceptor.abort();
        Ok(())
    }
}

async fn accept_loop(
    listener: TcpListener,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    outbound_capacity: usize,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let server_tx = server_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) =
                        handle_connection(stream, addr, server_tx, outbound_capacity).await
                    {
                        error!("Connection from {} failed: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    outbound_capacity: usize,
) -> Result<(), tungstenite::Error> {
    let mut format = WireFormat::default();
    let select_format = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        if let Some(path_and_query) = request.uri().path_and_query() {
            format = WireFormat::from_request_path(path_and_query.as_str());
        }
        Ok(response)
    };
    let mut ws_stream = tokio_tungstenite::accept_hdr_async(stream, select_format).await?;

    let (sender, mut receiver) = mpsc::channel::<Message>(outbound_capacity);
    let (reply_tx, reply_rx) = oneshot::channel();
    let connected = ServerMessage::Connected {
        addr,
        format,
        sender,
        reply: reply_tx,
    };
    if server_tx.send(connected).is_err() {
        return Ok(());
    }

    let player_id = match admission(reply_rx.await) {
        Ok(player_id) => player_id,
        Err(close) => {
            debug!("Closing {} without admission: {}", addr, close.reason);
            ws_stream.send(Message::Close(Some(close))).await?;
            return Ok(());
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let mut writer = tokio::spawn(async move {
        while let Some(message) = receiver.recv().await {
            if ws_sender.send(message).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    loop {
        tokio::select! {
            frame = ws_receiver.next() => {
                let message = match frame {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        debug!("Read error from {}: {}", player_id, e);
                        break;
                    }
                    None => break,
                };

                match decode_inbound(format, message) {
                    Inbound::Event(event) => {
                        if server_tx.send(ServerMessage::ClientEvent { player_id, event }).is_err() {
                            break;
                        }
                    }
                    Inbound::Ignored => {}
                    Inbound::Close => break,
                }
            }

            _ = &mut writer => {
                debug!("Outbound stream for {} ended", player_id);
                break;
            }
        }
    }

    if server_tx.send(ServerMessage::Disconnected { player_id }).is_err() {
        warn!("Main loop gone before {} disconnected", player_id);
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
pub(crate) enum Inbound {
    Event(ClientEvent),
    Ignored,
    Close,
}

/// Turns one inbound WebSocket message into an event. Frames that fail to
/// decode, or whose kind does not match the connection's format, are ignored.
/// Maps the main loop's answer to a player id or the close frame to send.
/// A dropped reply means the main loop is gone, not that the server is full.
fn admission(
    reply: Result<Option<PlayerId>, oneshot::error::RecvError>,
) -> Result<PlayerId, CloseFrame<'static>> {
    match reply {
        Ok(Some(player_id)) => Ok(player_id),
        Ok(None) => Err(CloseFrame {
            code: CloseCode::Policy,
            reason: "server full".into(),
        }),
        Err(_) => Err(CloseFrame {
            code: CloseCode::Away,
            reason: "server shutting down".into(),
        }),
    }
}

pub(crate) fn decode_inbound(format: WireFormat, message: Message) -> Inbound {
    let decoded = match (format, message) {
        (WireFormat::Json, Message::Text(text)) => codec::decode_text(&text),
        (WireFormat::Binary, Message::Binary(bytes)) => codec::decode_binary(&bytes),
        (_, Message::Close(_)) => return Inbound::Close,
        (_, Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => return Inbound::Ignored,
        (format, other) => {
            debug!("Dropping {}-byte frame of the wrong kind for {:?}", other.len(), format);
            return Inbound::Ignored;
        }
    };

    match decoded {
        Ok(event) => Inbound::Event(event),
        Err(e) => {
            debug!("Dropping undecodable frame: {}", e);
            Inbound::Ignored
        }
    }
}
