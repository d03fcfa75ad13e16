mod config;
mod player;
mod registry;

pub use config::RemoteConfig;
pub use player::{RemotePlayer, RemoteTransform, wrap_angle};
pub use registry::RemotePlayerRegistry;
