mod outbox;
mod types;

pub use outbox::{
    Emitter, FlushReport, Outbox, PendingEvent, RecordingTransport, TIMESTAMP_FIELD, Transport,
};
pub use types::{
    CombatEvent, CombatKind, GameEvent, PositionEvent, WeaponAction, WeaponEvent,
    WeaponEventData, WireVec3,
};
