use std::net::SocketAddr;

use skirmish::PeerId;

#[derive(Debug, Clone)]
pub enum RelayEvent {
    PeerConnected {
        peer_id: PeerId,
        addr: SocketAddr,
    },
    PeerDisconnected {
        peer_id: PeerId,
        reason: DisconnectReason,
    },
    ConnectionDenied {
        addr: SocketAddr,
        reason: String,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Graceful,
    Dropped,
    Shutdown,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::Graceful => "disconnected",
            DisconnectReason::Dropped => "lost connection",
            DisconnectReason::Shutdown => "closed at shutdown",
        }
    }
}
