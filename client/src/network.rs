use futures_util::{SinkExt, StreamExt};
use log::{debug, info};
use shared::codec::{self, MAX_SERVER_FRAME_BYTES};
use shared::{ClientEvent, CodecError, Frame, ServerEvent, WireFormat};
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    Ws(#[from] tungstenite::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("timed out waiting for the server")]
    Timeout,
    #[error("connection closed by the server")]
    Closed,
}

/// Appends the binary format selector to a server URL when needed. A bare
/// `ws://host:port` gets a `/` path first so the request line stays valid.
pub fn request_url(server: &str, format: WireFormat) -> String {
    if format == WireFormat::Json {
        return server.to_string();
    }
    if server.contains('?') {
        return format!("{}&format=binary", server);
    }

    let authority_and_path = server.split_once("://").map_or(server, |(_, rest)| rest);
    if authority_and_path.contains('/') {
        format!("{}?format=binary", server)
    } else {
        format!("{}/?format=binary", server)
    }
}

/// One WebSocket connection to the world server.
#[derive(Debug)]
pub struct WorldClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    format: WireFormat,
    close_frame: Option<CloseFrame<'static>>,
}

impl WorldClient {
    pub async fn connect(server: &str, format: WireFormat) -> Result<Self, ClientError> {
        let url = request_url(server, format);
        let (stream, _response) = connect_async(url.as_str()).await?;
        info!("Connected to {} ({:?})", url, format);

        Ok(WorldClient {
            stream,
            format,
            close_frame: None,
        })
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// The close frame sent by the server, once one has been received.
    pub fn close_frame(&self) -> Option<&CloseFrame<'static>> {
        self.close_frame.as_ref()
    }

    pub async fn send(&mut self, event: &ClientEvent) -> Result<(), ClientError> {
        let message = match codec::encode(self.format, event)? {
            Frame::Text(text) => Message::Text(text),
            Frame::Binary(bytes) => Message::Binary(bytes),
        };
        self.stream.send(message).await?;
        Ok(())
    }

    /// Sends a message as-is, bypassing the codec.
    pub async fn send_raw(&mut self, message: Message) -> Result<(), ClientError> {
        self.stream.send(message).await?;
        Ok(())
    }

    /// Next server event, or `None` once the server has closed the
    /// connection. Control frames are skipped.
    pub async fn recv(&mut self) -> Result<Option<ServerEvent>, ClientError> {
        while let Some(message) = self.stream.next().await {
            match message? {
                Message::Text(text) => return Ok(Some(codec::decode_text(&text)?)),
                Message::Binary(bytes) => {
                    let event = codec::decode_binary_within(&bytes, MAX_SERVER_FRAME_BYTES)?;
                    return Ok(Some(event));
                }
                Message::Close(frame) => {
                    debug!("Server closed the connection: {:?}", frame);
                    self.close_frame = frame;
                    return Ok(None);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
        Ok(None)
    }

    pub async fn recv_timeout(&mut self, within: Duration) -> Result<Option<ServerEvent>, ClientError> {
        tokio::time::timeout(within, self.recv())
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    /// Skips events until one satisfies `predicate`.
    pub async fn next_matching<F>(
        &mut self,
        within: Duration,
        mut predicate: F,
    ) -> Result<ServerEvent, ClientError>
    where
        F: FnMut(&ServerEvent) -> bool,
    {
        let search = async {
            loop {
                match self.recv().await {
                    Ok(Some(event)) if predicate(&event) => return Ok(event),
                    Ok(Some(_)) => continue,
                    Ok(None) => return Err(ClientError::Closed),
                    Err(e) => return Err(e),
                }
            }
        };

        tokio::time::timeout(within, search)
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        match self.stream.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    #[test]
    fn test_request_url() {
        assert_eq!(
            request_url("ws://127.0.0.1:5000", WireFormat::Json),
            "ws://127.0.0.1:5000"
        );
        assert_eq!(
            request_url("ws://127.0.0.1:5000", WireFormat::Binary),
            "ws://127.0.0.1:5000/?format=binary"
        );
        assert_eq!(
            request_url("ws://host/world", WireFormat::Binary),
            "ws://host/world?format=binary"
        );
        assert_eq!(
            request_url("ws://host/world?room=a", WireFormat::Binary),
            "ws://host/world?room=a&format=binary"
        );
    }

    #[test]
    fn test_selected_url_round_trips_through_server_parsing() {
        let url = request_url("ws://127.0.0.1:5000/", WireFormat::Binary);
        let path = url.trim_start_matches("ws://127.0.0.1:5000");
        assert_eq!(WireFormat::from_request_path(path), WireFormat::Binary);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("ws://127.0.0.1:{}", port);

        let error = assert_err!(WorldClient::connect(&url, WireFormat::Json).await);
        assert!(matches!(error, ClientError::Ws(_)));
    }
}
