use serde_json::Value;
use skirmish::{Transport, WireMessage};
use tokio::sync::mpsc::UnboundedSender;

/// Encodes outbound payloads as text frames for the socket writer task.
pub struct ChannelTransport {
    outbound: UnboundedSender<String>,
    frames_sent: u64,
}

impl ChannelTransport {
    pub fn new(outbound: UnboundedSender<String>) -> Self {
        Self {
            outbound,
            frames_sent: 0,
        }
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, event_name: &str, payload: Value) {
        let text = match WireMessage::new(event_name, payload).encode() {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Failed to encode {}: {}", event_name, e);
                return;
            }
        };

        if self.outbound.send(text).is_ok() {
            self.frames_sent += 1;
        } else {
            log::debug!("Dropped {}: socket writer has stopped", event_name);
        }
    }

    fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }
}
