//! Fan-out of server events to session queues.
//!
//! Delivery is best-effort: a frame is pushed onto each recipient's bounded
//! outbound queue without waiting. A full queue drops the frame for that
//! session only, and a closed queue means the session is already on its way
//! out. Nothing is acknowledged or retried.

use crate::session::SessionManager;
use log::{debug, error, warn};
use shared::{codec, Frame, PlayerId, ServerEvent, WireFormat};
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipients {
    One(PlayerId),
    AllExcept(PlayerId),
    All,
}

impl Recipients {
    pub fn includes(&self, id: PlayerId) -> bool {
        match *self {
            Recipients::One(target) => id == target,
            Recipients::AllExcept(excluded) => id != excluded,
            Recipients::All => true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub dropped: usize,
}

pub fn frame_to_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text),
        Frame::Binary(bytes) => Message::Binary(bytes),
    }
}

/// Encodes an event at most once per wire format, on first demand.
struct EncodedEvent<'a> {
    event: &'a ServerEvent,
    json: Option<Message>,
    binary: Option<Message>,
}

impl<'a> EncodedEvent<'a> {
    fn new(event: &'a ServerEvent) -> Self {
        Self {
            event,
            json: None,
            binary: None,
        }
    }

    fn message(&mut self, format: WireFormat) -> Option<Message> {
        let slot = match format {
            WireFormat::Json => &mut self.json,
            WireFormat::Binary => &mut self.binary,
        };

        if slot.is_none() {
            match codec::encode(format, self.event) {
                Ok(frame) => *slot = Some(frame_to_message(frame)),
                Err(e) => {
                    error!("Failed to encode {}: {}", self.event.name(), e);
                    return None;
                }
            }
        }

        slot.clone()
    }
}

pub fn dispatch(
    sessions: &SessionManager,
    recipients: Recipients,
    event: &ServerEvent,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    let mut encoded = EncodedEvent::new(event);

    for session in sessions.iter().filter(|s| recipients.includes(s.id)) {
        let Some(message) = encoded.message(session.format) else {
            report.dropped += 1;
            continue;
        };

        let was_backlogged = session.is_backlogged();
        match session.try_send(message) {
            Ok(()) => {
                if was_backlogged {
                    debug!("Outbound queue for {} drained", session.id);
                }
                report.delivered += 1;
            }
            Err(TrySendError::Full(_)) => {
                if was_backlogged {
                    debug!("Outbound queue still full for {}, dropping {}", session.id, event.name());
                } else {
                    warn!(
                        "Outbound queue full for {}, dropping {} and later frames until it drains",
                        session.id,
                        event.name()
                    );
                }
                report.dropped += 1;
            }
            Err(TrySendError::Closed(_)) => {
                debug!("{} is closing, skipping {}", session.id, event.name());
                report.dropped += 1;
            }
        }
    }

    report
}
