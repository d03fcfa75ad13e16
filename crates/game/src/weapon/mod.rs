mod bullet;
mod kind;
mod slot;
mod system;

pub use bullet::{Bullet, SHOTGUN_SPREAD, spawn_bullets, spread_directions};
pub use kind::{DEFAULT_LOADOUT, WeaponKind, WeaponStats};
pub use slot::{FireBlocked, WeaponSlot};
pub use system::{
    BARREL_LENGTH, DroppedWeapon, MUZZLE_HEIGHT, ModelPlacement, PickupOutcome, WeaponSystem,
    forward,
};
