use glam::Vec3;

use super::config::PlayerConfig;
use super::input::{InputFlags, PlayerInput};
use crate::event::{CombatEvent, CombatKind, Emitter, GameEvent, PositionEvent};
use crate::net::{NetworkGuard, Networked};
use crate::scene::SceneQueue;
use crate::weapon::{DEFAULT_LOADOUT, DroppedWeapon, FireBlocked, WeaponKind, WeaponSystem};

/// Id used for the local player before the relay assigns one.
pub const UNASSIGNED_ID: &str = "local";

/// What one frame of input did beyond moving the player.
#[derive(Debug, Default, PartialEq)]
pub struct InputOutcome {
    pub bullets_fired: usize,
    pub fire_blocked: Option<FireBlocked>,
    pub reloaded: bool,
    pub switched: bool,
    pub dropped: Option<DroppedWeapon>,
    pub interact: bool,
}

#[derive(Debug)]
pub struct LocalPlayer {
    id: String,
    config: PlayerConfig,
    position: Vec3,
    rotation: f32,
    health: i32,
    weapons: WeaponSystem,
    guard: NetworkGuard,
    held: InputFlags,
}

impl LocalPlayer {
    pub fn new(config: PlayerConfig, emitter: Emitter, scene: SceneQueue) -> Self {
        let weapons = WeaponSystem::new(
            UNASSIGNED_ID,
            &DEFAULT_LOADOUT,
            NetworkGuard::new(emitter.clone()),
            scene,
        );

        Self {
            id: UNASSIGNED_ID.to_string(),
            position: config.spawn_position,
            rotation: 0.0,
            health: config.max_health,
            config,
            weapons,
            guard: NetworkGuard::new(emitter),
            held: InputFlags::empty(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
        self.weapons.set_owner(self.id.clone());
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn height(&self) -> f32 {
        self.config.player_height
    }

    pub fn weapons(&self) -> &WeaponSystem {
        &self.weapons
    }

    pub fn weapons_mut(&mut self) -> &mut WeaponSystem {
        &mut self.weapons
    }

    /// Moves, aims and drives the weapon for one frame. `now` is seconds.
    pub fn apply_input(&mut self, input: &PlayerInput, delta: f32, now: f64) -> InputOutcome {
        let pressed = input.flags & !self.held & InputFlags::EDGE_TRIGGERED;
        self.held = input.flags;

        let mut outcome = InputOutcome::default();
        if self.is_dead() {
            return outcome;
        }

        self.rotation = input.aim_rotation;
        self.position += input.move_direction() * self.config.move_speed * delta;

        if pressed.contains(InputFlags::NEXT_WEAPON) {
            outcome.switched |= self.weapons.next();
        }
        if pressed.contains(InputFlags::PREV_WEAPON) {
            outcome.switched |= self.weapons.previous();
        }
        if pressed.contains(InputFlags::DROP_WEAPON) {
            outcome.dropped = self.weapons.drop_current();
        }
        if pressed.contains(InputFlags::RELOAD) {
            outcome.reloaded = self.weapons.reload(now);
        }
        if input.flags.contains(InputFlags::FIRE) {
            match self.weapons.shoot(self.position, self.rotation, now) {
                Ok(count) => outcome.bullets_fired = count,
                Err(blocked) => outcome.fire_blocked = Some(blocked),
            }
        }
        outcome.interact = pressed.contains(InputFlags::INTERACT);

        self.weapons.place_model(self.position, self.rotation);
        outcome
    }

    pub fn broadcast_position(&self) -> bool {
        self.emit(GameEvent::Position(PositionEvent {
            position: self.position.into(),
            rotation: self.rotation,
        }))
    }

    /// Applies damage from `source_id` and reports it. Returns the new health.
    pub fn take_damage(&mut self, source_id: &str, amount: i32, weapon_type: Option<WeaponKind>) -> i32 {
        let was_alive = !self.is_dead();
        self.health = (self.health - amount).clamp(0, self.config.max_health);

        let weapon_type = weapon_type.map(|kind| kind.name().to_string());
        self.emit(GameEvent::Combat(CombatEvent {
            kind: CombatKind::Damage,
            source_id: source_id.to_string(),
            target_id: self.id.clone(),
            damage: Some(amount),
            weapon_type: weapon_type.clone(),
            position: Some(self.position.into()),
        }));

        if was_alive && self.is_dead() {
            log::info!("{} was eliminated by {}", self.id, source_id);
            self.emit(GameEvent::Combat(CombatEvent {
                kind: CombatKind::Kill,
                source_id: source_id.to_string(),
                target_id: self.id.clone(),
                damage: None,
                weapon_type,
                position: Some(self.position.into()),
            }));
        }

        self.health
    }
}

impl Networked for LocalPlayer {
    fn guard(&self) -> &NetworkGuard {
        &self.guard
    }
}
