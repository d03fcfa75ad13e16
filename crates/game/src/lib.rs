pub mod combat;
pub mod effects;
pub mod event;
pub mod game;
pub mod hud;
pub mod map;
pub mod net;
pub mod pickup;
pub mod player;
pub mod remote;
pub mod scene;
pub mod time;
pub mod weapon;

pub use combat::{Aabb, BULLET_DAMAGE, CollisionDetector, NoCollision};
pub use effects::{EffectHandle, EffectsScheduler};
pub use event::{
    Emitter, FlushReport, GameEvent, Outbox, PendingEvent, RecordingTransport, Transport,
};
pub use game::{FrameReport, Game, GameConfig, GameStats};
pub use hud::{AmmoIndicator, Notification, NotificationIcon, Notifications};
pub use map::{Arena, Prop, PropKind};
pub use net::{
    DropReason, InboundEvent, NetConfig, NetworkGuard, Networked, PeerId, WireMessage,
};
pub use pickup::{Collected, PickupField, PickupKind};
pub use player::{InputFlags, LocalPlayer, PlayerConfig, PlayerInput};
pub use remote::{RemoteConfig, RemotePlayer, RemotePlayerRegistry};
pub use scene::{SceneEvent, SceneQueue};
pub use time::{Clock, FixedInterval, ManualClock, SystemClock};
pub use weapon::{WeaponKind, WeaponSlot, WeaponSystem};
