//! Frame encoding for both supported wire formats.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on a decoded binary frame from a client.
pub const MAX_FRAME_BYTES: u64 = 64 * 1024;

/// Upper bound on a decoded binary frame from the server. Snapshots grow
/// with the item count, so this matches tungstenite's default frame limit.
pub const MAX_SERVER_FRAME_BYTES: u64 = 16 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireFormat {
    /// UTF-8 JSON in text frames.
    #[default]
    Json,
    /// bincode in binary frames.
    Binary,
}

impl WireFormat {
    /// Picks the format requested by a handshake path such as `/binary` or
    /// `/?format=binary`. Anything else is JSON.
    pub fn from_request_path(path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };

        let wants_binary = path.trim_end_matches('/').ends_with("/binary")
            || query
                .split('&')
                .any(|pair| pair == "format=binary" || pair == "format=bincode");

        if wants_binary {
            WireFormat::Binary
        } else {
            WireFormat::Json
        }
    }
}

/// One encoded event, independent of any WebSocket implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary codec error: {0}")]
    Binary(#[from] bincode::Error),
}

fn binary_options() -> impl Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// Outbound frames are never size-limited; limits apply when decoding.
pub fn encode<T: Serialize>(format: WireFormat, value: &T) -> Result<Frame, CodecError> {
    match format {
        WireFormat::Json => Ok(Frame::Text(serde_json::to_string(value)?)),
        WireFormat::Binary => Ok(Frame::Binary(binary_options().serialize(value)?)),
    }
}

pub fn decode_text<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decodes a client frame, bounded by [`MAX_FRAME_BYTES`].
pub fn decode_binary<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    decode_binary_within(bytes, MAX_FRAME_BYTES)
}

pub fn decode_binary_within<T: DeserializeOwned>(bytes: &[u8], limit: u64) -> Result<T, CodecError> {
    Ok(binary_options().with_limit(limit).deserialize(bytes)?)
}

pub fn decode<T: DeserializeOwned>(frame: &Frame) -> Result<T, CodecError> {
    match frame {
        Frame::Text(text) => decode_text(text),
        Frame::Binary(bytes) => decode_binary(bytes),
    }
}
