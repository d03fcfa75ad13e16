use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::json;
use skirmish::net::protocol::{USER_CONNECTED, USER_DISCONNECTED, USER_ID_FIELD, USER_WELCOME};
use skirmish::net::{EnvelopeError, stamp_sender};
use skirmish::{PeerId, WireMessage};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::events::{DisconnectReason, RelayEvent};

/// Events in this namespace are only ever produced by the relay.
const RESERVED_PREFIX: &str = "user.";

pub type SharedRelay = Arc<Mutex<Relay>>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay is full ({max} peers)")]
    Full { max: usize },
    #[error("unknown peer {0}")]
    UnknownPeer(PeerId),
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },
    #[error("peers may not send reserved event {0}")]
    ReservedEvent(String),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

#[derive(Debug)]
struct Peer {
    addr: SocketAddr,
    outbound: UnboundedSender<String>,
    joined_at: Instant,
    frames_received: u64,
}

#[derive(Debug, Clone)]
pub struct PeerInfo {
    pub peer_id: PeerId,
    pub addr: String,
    pub connected_secs: u64,
    pub frames_received: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RelayStats {
    pub uptime_secs: u64,
    pub peer_count: usize,
    pub max_peers: usize,
    pub frames_received: u64,
    pub frames_relayed: u64,
    pub frames_rejected: u64,
    pub bytes_received: u64,
    pub bytes_sent: u64,
}

/// Peer table and fan-out. Socket tasks push text frames in and receive
/// encoded frames through each peer's outbound channel.
pub struct Relay {
    config: RelayConfig,
    peers: HashMap<PeerId, Peer>,
    join_order: Vec<PeerId>,
    pending_events: VecDeque<RelayEvent>,
    stats: RelayStats,
    started: Instant,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            stats: RelayStats {
                max_peers: config.max_peers,
                ..Default::default()
            },
            config,
            peers: HashMap::new(),
            join_order: Vec::new(),
            pending_events: VecDeque::new(),
            started: Instant::now(),
        }
    }

    pub fn shared(config: RelayConfig) -> SharedRelay {
        Arc::new(Mutex::new(Self::new(config)))
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = RelayEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub fn report_error(&mut self, message: impl Into<String>) {
        self.pending_events.push_back(RelayEvent::Error {
            message: message.into(),
        });
    }

    /// Admits a peer: welcomes it with its id, introduces the peers already
    /// present and announces it to them.
    pub fn join(&mut self, addr: SocketAddr, outbound: UnboundedSender<String>) -> Result<PeerId, RelayError> {
        if self.peers.len() >= self.config.max_peers {
            let err = RelayError::Full {
                max: self.config.max_peers,
            };
            self.pending_events.push_back(RelayEvent::ConnectionDenied {
                addr,
                reason: err.to_string(),
            });
            return Err(err);
        }

        let peer_id = Uuid::new_v4().to_string();

        let welcome = presence(USER_WELCOME, &peer_id, format!("welcome, {peer_id}"))?;
        self.stats.bytes_sent += welcome.len() as u64;
        let _ = outbound.send(welcome);

        for existing in &self.join_order {
            let intro = presence(USER_CONNECTED, existing, format!("{existing} is here"))?;
            self.stats.bytes_sent += intro.len() as u64;
            let _ = outbound.send(intro);
        }

        let announce = presence(USER_CONNECTED, &peer_id, format!("{peer_id} joined"))?;
        self.broadcast(&peer_id, &announce);

        self.peers.insert(
            peer_id.clone(),
            Peer {
                addr,
                outbound,
                joined_at: Instant::now(),
                frames_received: 0,
            },
        );
        self.join_order.push(peer_id.clone());

        log::info!("Peer {} joined from {}", peer_id, addr);
        self.pending_events.push_back(RelayEvent::PeerConnected {
            peer_id: peer_id.clone(),
            addr,
        });
        Ok(peer_id)
    }

    /// Removes a peer and tells everyone else. Returns false if it was not present.
    pub fn leave(&mut self, peer_id: &str, reason: DisconnectReason) -> bool {
        if self.peers.remove(peer_id).is_none() {
            return false;
        }
        self.join_order.retain(|id| id != peer_id);

        match presence(USER_DISCONNECTED, peer_id, format!("{peer_id} left")) {
            Ok(farewell) => {
                self.broadcast(peer_id, &farewell);
            }
            Err(e) => self.report_error(format!("Failed to announce departure of {peer_id}: {e}")),
        }

        log::info!("Peer {} {}", peer_id, reason.as_str());
        self.pending_events.push_back(RelayEvent::PeerDisconnected {
            peer_id: peer_id.to_string(),
            reason,
        });
        true
    }

    /// Stamps a frame from `peer_id` with its id and forwards it to every
    /// other peer. Returns the number of peers it was sent to.
    pub fn relay(&mut self, peer_id: &str, text: &str) -> Result<usize, RelayError> {
        let result = self.forward(peer_id, text);
        if result.is_err() {
            self.stats.frames_rejected += 1;
        }
        result
    }

    fn forward(&mut self, peer_id: &str, text: &str) -> Result<usize, RelayError> {
        let Some(peer) = self.peers.get_mut(peer_id) else {
            return Err(RelayError::UnknownPeer(peer_id.to_string()));
        };
        peer.frames_received += 1;
        self.stats.frames_received += 1;
        self.stats.bytes_received += text.len() as u64;

        if text.len() > self.config.max_frame_bytes {
            return Err(RelayError::FrameTooLarge {
                size: text.len(),
                max: self.config.max_frame_bytes,
            });
        }

        let message = WireMessage::decode(text)?;
        if message.event.starts_with(RESERVED_PREFIX) {
            return Err(RelayError::ReservedEvent(message.event));
        }

        let stamped = WireMessage::new(message.event, stamp_sender(message.payload, peer_id));
        let encoded = stamped.encode()?;
        let delivered = self.broadcast(peer_id, &encoded);
        if delivered > 0 {
            self.stats.frames_relayed += 1;
        }
        Ok(delivered)
    }

    fn broadcast(&mut self, from: &str, text: &str) -> usize {
        let mut delivered = 0;
        for (peer_id, peer) in &self.peers {
            if peer_id == from {
                continue;
            }
            if peer.outbound.send(text.to_string()).is_ok() {
                delivered += 1;
                self.stats.bytes_sent += text.len() as u64;
            }
        }
        delivered
    }

    /// Drops every peer; their writer tasks end once the channels close.
    pub fn disconnect_all(&mut self) {
        let peer_ids: Vec<PeerId> = self.join_order.clone();
        for peer_id in peer_ids {
            self.leave(&peer_id, DisconnectReason::Shutdown);
        }
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            uptime_secs: self.started.elapsed().as_secs(),
            peer_count: self.peers.len(),
            ..self.stats.clone()
        }
    }

    pub fn peer_infos(&self) -> Vec<PeerInfo> {
        self.join_order
            .iter()
            .filter_map(|id| self.peers.get(id).map(|peer| (id, peer)))
            .map(|(id, peer)| PeerInfo {
                peer_id: id.clone(),
                addr: peer.addr.to_string(),
                connected_secs: peer.joined_at.elapsed().as_secs(),
                frames_received: peer.frames_received,
            })
            .collect()
    }
}

fn presence(event: &str, peer_id: &str, message: String) -> Result<String, EnvelopeError> {
    WireMessage::new(event, json!({ USER_ID_FIELD: peer_id, "message": message })).encode()
}
