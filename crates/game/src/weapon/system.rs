use glam::Vec3;

use super::bullet::{Bullet, spawn_bullets};
use super::kind::WeaponKind;
use super::slot::{FireBlocked, WeaponSlot};
use crate::combat::CollisionDetector;
use crate::event::{GameEvent, WeaponAction, WeaponEvent, WeaponEventData};
use crate::net::{NetworkGuard, Networked};
use crate::scene::{SceneEvent, SceneQueue};

/// Distance from the owner's origin to the muzzle along its facing.
pub const BARREL_LENGTH: f32 = 0.6;
/// Muzzle height above the owner's body centre.
pub const MUZZLE_HEIGHT: f32 = 0.2;

/// Unit facing for a rotation around Y, zero pointing down +Z.
pub fn forward(rotation: f32) -> Vec3 {
    Vec3::new(rotation.sin(), 0.0, rotation.cos())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedWeapon {
    pub kind: WeaponKind,
    pub ammo: u32,
    pub total_ammo: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickupOutcome {
    /// Filled a previously empty slot.
    Filled(usize),
    /// Ammo was added to a slot already holding the same kind.
    Merged(usize),
    /// The current slot was swapped out for the picked up weapon.
    Replaced {
        index: usize,
        previous: DroppedWeapon,
    },
}

impl PickupOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Filled(index) | Self::Merged(index) => *index,
            Self::Replaced { index, .. } => *index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPlacement {
    pub position: Vec3,
    pub rotation: f32,
}

/// Inventory plus the bullets it has fired. Used for the local player and
/// for every remote replica.
#[derive(Debug)]
pub struct WeaponSystem {
    owner: String,
    slots: Vec<WeaponSlot>,
    current: usize,
    bullets: Vec<Bullet>,
    guard: NetworkGuard,
    scene: SceneQueue,
    placement: Option<ModelPlacement>,
}

impl WeaponSystem {
    pub fn new(
        owner: impl Into<String>,
        loadout: &[WeaponKind],
        guard: NetworkGuard,
        scene: SceneQueue,
    ) -> Self {
        let slots = loadout.iter().map(|&kind| WeaponSlot::new(kind)).collect();
        Self::from_slots(owner, slots, guard, scene)
    }

    pub fn from_slots(
        owner: impl Into<String>,
        mut slots: Vec<WeaponSlot>,
        guard: NetworkGuard,
        scene: SceneQueue,
    ) -> Self {
        if slots.is_empty() {
            slots.push(WeaponSlot::empty());
        }

        let system = Self {
            owner: owner.into(),
            slots,
            current: 0,
            bullets: Vec::new(),
            guard,
            scene,
            placement: None,
        };
        system.attach_model(system.current);
        system
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn set_owner(&mut self, owner: impl Into<String>) {
        self.owner = owner.into();
    }

    pub fn slots(&self) -> &[WeaponSlot] {
        &self.slots
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &WeaponSlot {
        &self.slots[self.current]
    }

    pub fn current_kind(&self) -> WeaponKind {
        self.current().kind
    }

    pub fn slot_index_of(&self, kind: WeaponKind) -> Option<usize> {
        self.slots.iter().position(|slot| slot.kind == kind)
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn placement(&self) -> Option<ModelPlacement> {
        self.placement
    }

    pub fn place_model(&mut self, position: Vec3, rotation: f32) {
        self.placement = Some(ModelPlacement { position, rotation });
    }

    /// Local fire path: derives the muzzle from the owner transform.
    pub fn shoot(&mut self, origin: Vec3, rotation: f32, now: f64) -> Result<usize, FireBlocked> {
        let direction = forward(rotation);
        let muzzle = origin + Vec3::Y * MUZZLE_HEIGHT + direction * BARREL_LENGTH;

        let slot = &mut self.slots[self.current];
        if let Err(blocked) = slot.consume_round(now) {
            log::debug!("{} could not fire {}: {}", self.owner, slot.kind, blocked);
            return Err(blocked);
        }

        Ok(self.spawn_and_announce(muzzle, direction))
    }

    /// Remote fire path: spawns at an explicit muzzle position. The shooter
    /// already gated the shot, so only the sentinel blocks it here.
    pub fn fire_from(&mut self, position: Vec3, direction: Vec3, now: f64) -> usize {
        let slot = &mut self.slots[self.current];
        if slot.is_empty() {
            log::debug!("{} fired while holding no weapon", self.owner);
            return 0;
        }
        slot.bullets_in_magazine = slot.bullets_in_magazine.saturating_sub(1);
        slot.last_shot = Some(now);

        self.spawn_and_announce(position, direction.normalize_or_zero())
    }

    /// Overwrites the current slot's counters with values reported by its owner.
    pub fn sync_ammo(&mut self, ammo: Option<u32>, total_ammo: Option<u32>) {
        self.sync_slot_ammo(self.current, ammo, total_ammo);
    }

    /// Same as [`sync_ammo`](Self::sync_ammo) for any slot. Empty slots keep no ammo.
    pub fn sync_slot_ammo(&mut self, index: usize, ammo: Option<u32>, total_ammo: Option<u32>) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if slot.is_empty() {
            return;
        }
        if let Some(ammo) = ammo {
            slot.bullets_in_magazine = ammo.min(slot.max_magazine_size());
        }
        if let Some(total) = total_ammo {
            slot.total_bullets = total;
        }
    }

    fn spawn_and_announce(&mut self, position: Vec3, direction: Vec3) -> usize {
        let kind = self.current_kind();
        let spawned = spawn_bullets(kind, position, direction);
        let count = spawned.len();
        self.bullets.extend(spawned);

        let slot = self.current();
        let data = WeaponEventData {
            ammo: Some(slot.bullets_in_magazine),
            total_ammo: Some(slot.total_bullets),
            position: Some(position.into()),
            direction: Some(direction.into()),
        };
        self.emit(self.weapon_event(WeaponAction::Shoot, kind, Some(data)));
        count
    }

    pub fn reload(&mut self, now: f64) -> bool {
        let slot = &mut self.slots[self.current];
        if !slot.start_reload(now) {
            log::debug!("{} ignored reload of {}", self.owner, slot.kind);
            return false;
        }

        let kind = slot.kind;
        let data = self.ammo_data(self.current);
        self.emit(self.weapon_event(WeaponAction::Reload, kind, Some(data)));
        true
    }

    /// Finishes any reload whose duration has elapsed. Returns how many did.
    pub fn poll_reload(&mut self, now: f64) -> usize {
        self.slots
            .iter_mut()
            .filter(|slot| slot.is_reloading)
            .map(|slot| slot.poll_reload(now))
            .filter(|&done| done)
            .count()
    }

    pub fn next(&mut self) -> bool {
        let index = (self.current + 1) % self.slots.len();
        self.switch_to(index)
    }

    pub fn previous(&mut self) -> bool {
        let index = (self.current + self.slots.len() - 1) % self.slots.len();
        self.switch_to(index)
    }

    pub fn switch_to(&mut self, index: usize) -> bool {
        if index >= self.slots.len() {
            log::warn!("{} cannot switch to slot {} of {}", self.owner, index, self.slots.len());
            return false;
        }
        if index == self.current {
            return false;
        }

        self.detach_model(self.current);
        self.current = index;
        self.attach_model(index);

        let kind = self.current_kind();
        let data = self.ammo_data(index);
        self.emit(self.weapon_event(WeaponAction::Switch, kind, Some(data)));
        true
    }

    /// Empties the current slot in place and hands back what was in it.
    pub fn drop_current(&mut self) -> Option<DroppedWeapon> {
        if self.slots.len() < 2 || self.current().is_empty() {
            return None;
        }

        let slot = std::mem::replace(&mut self.slots[self.current], WeaponSlot::empty());
        self.detach_model_kind(slot.kind);

        let dropped = DroppedWeapon {
            kind: slot.kind,
            ammo: slot.bullets_in_magazine,
            total_ammo: slot.total_bullets,
        };

        let data = WeaponEventData {
            ammo: Some(dropped.ammo),
            total_ammo: Some(dropped.total_ammo),
            ..Default::default()
        };
        self.emit(self.weapon_event(WeaponAction::Drop, dropped.kind, Some(data)));

        if let Some(index) = self.slots.iter().position(|slot| !slot.is_empty()) {
            self.current = index;
            self.attach_model(index);
        }

        Some(dropped)
    }

    /// Whether picking up `kind` would have to swap out the held weapon.
    pub fn pickup_would_replace(&self, kind: WeaponKind) -> bool {
        self.slot_index_of(kind).is_none() && !self.slots.iter().any(WeaponSlot::is_empty)
    }

    pub fn pick_up(&mut self, kind: WeaponKind, ammo: u32, total_ammo: u32) -> Option<PickupOutcome> {
        if kind.is_empty() {
            return None;
        }

        let was_unarmed = self.current().is_empty();
        let outcome = if let Some(index) = self.slot_index_of(kind) {
            self.slots[index].total_bullets += ammo + total_ammo;
            PickupOutcome::Merged(index)
        } else if let Some(index) = self.slots.iter().position(|slot| slot.is_empty()) {
            self.slots[index] = WeaponSlot::with_ammo(kind, ammo, total_ammo);
            PickupOutcome::Filled(index)
        } else {
            let index = self.current;
            self.detach_model(index);
            let previous = std::mem::replace(
                &mut self.slots[index],
                WeaponSlot::with_ammo(kind, ammo, total_ammo),
            );
            self.attach_model(index);
            PickupOutcome::Replaced {
                index,
                previous: DroppedWeapon {
                    kind: previous.kind,
                    ammo: previous.bullets_in_magazine,
                    total_ammo: previous.total_bullets,
                },
            }
        };

        let index = outcome.index();
        if was_unarmed && !self.slots[index].is_empty() {
            self.current = index;
            self.attach_model(index);
        }

        let data = self.ammo_data(index);
        self.emit(self.weapon_event(WeaponAction::Pickup, kind, Some(data)));
        Some(outcome)
    }

    /// Adds reserve ammo to the held weapon, or the first armed slot.
    pub fn add_reserve(&mut self, amount: u32) -> bool {
        let index = if self.current().is_empty() {
            match self.slots.iter().position(|slot| !slot.is_empty()) {
                Some(index) => index,
                None => return false,
            }
        } else {
            self.current
        };
        self.slots[index].total_bullets += amount;
        true
    }

    /// Advances bullets and tests each survivor once. Returns impact points.
    pub fn update_bullets(&mut self, delta: f32, detector: &mut dyn CollisionDetector) -> Vec<Vec3> {
        let mut impacts = Vec::new();
        self.bullets.retain_mut(|bullet| {
            if !bullet.advance(delta) {
                return false;
            }
            if detector.check_for_bullet_collision(bullet.position) {
                impacts.push(bullet.position);
                return false;
            }
            true
        });
        impacts
    }

    pub fn clear_bullets(&mut self) {
        self.bullets.clear();
    }

    fn ammo_data(&self, index: usize) -> WeaponEventData {
        let slot = &self.slots[index];
        WeaponEventData {
            ammo: Some(slot.bullets_in_magazine),
            total_ammo: Some(slot.total_bullets),
            ..Default::default()
        }
    }

    fn weapon_event(
        &self,
        action: WeaponAction,
        kind: WeaponKind,
        data: Option<WeaponEventData>,
    ) -> GameEvent {
        GameEvent::Weapon(WeaponEvent {
            weapon_type: kind.name().to_string(),
            action,
            data,
        })
    }

    fn attach_model(&self, index: usize) {
        let kind = self.slots[index].kind;
        if !kind.is_empty() {
            self.scene.push(SceneEvent::WeaponAttached {
                owner: self.owner.clone(),
                kind,
            });
        }
    }

    fn detach_model(&self, index: usize) {
        self.detach_model_kind(self.slots[index].kind);
    }

    fn detach_model_kind(&self, kind: WeaponKind) {
        if !kind.is_empty() {
            self.scene.push(SceneEvent::WeaponDetached {
                owner: self.owner.clone(),
                kind,
            });
        }
    }
}

impl Networked for WeaponSystem {
    fn guard(&self) -> &NetworkGuard {
        &self.guard
    }
}
