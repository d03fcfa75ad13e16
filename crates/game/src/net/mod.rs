mod config;
mod guard;
pub mod protocol;

pub use config::NetConfig;
pub use guard::{NetworkGuard, Networked, SuppressScope};
pub use protocol::{
    DropReason, EnvelopeError, InboundEvent, PeerId, WireMessage, decode, decode_one,
    stamp_sender,
};
