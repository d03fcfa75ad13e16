mod config;
mod input;
mod local;

pub use config::PlayerConfig;
pub use input::{InputFlags, PlayerInput};
pub use local::{InputOutcome, LocalPlayer, UNASSIGNED_ID};
