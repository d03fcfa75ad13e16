use glam::Vec3;

use crate::effects::{EffectHandle, EffectsScheduler, HoverEffect};
use crate::scene::{SceneEvent, SceneQueue};
use crate::weapon::{DroppedWeapon, PickupOutcome, WeaponKind, WeaponSystem};

#[derive(Debug, Clone, PartialEq)]
pub enum PickupKind {
    Weapon {
        kind: WeaponKind,
        magazine: u32,
        total: u32,
    },
    Ammo {
        amount: u32,
    },
}

impl From<DroppedWeapon> for PickupKind {
    fn from(dropped: DroppedWeapon) -> Self {
        Self::Weapon {
            kind: dropped.kind,
            magazine: dropped.ammo,
            total: dropped.total_ammo,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub position: Vec3,
    effect: EffectHandle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    Weapon {
        pickup_id: u32,
        outcome: PickupOutcome,
    },
    Ammo {
        pickup_id: u32,
        amount: u32,
    },
}

/// Items lying in the world waiting to be collected.
pub struct PickupField {
    pickups: Vec<Pickup>,
    next_id: u32,
    scene: SceneQueue,
}

impl PickupField {
    pub fn new(scene: SceneQueue) -> Self {
        Self {
            pickups: Vec::new(),
            next_id: 1,
            scene,
        }
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }

    pub fn spawn(&mut self, kind: PickupKind, position: Vec3, effects: &mut EffectsScheduler) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let effect = effects.register(HoverEffect::default());
        self.scene.push(SceneEvent::PickupSpawned {
            id,
            kind: kind.clone(),
            position,
        });
        self.pickups.push(Pickup {
            id,
            kind,
            position,
            effect,
        });
        id
    }

    pub fn remove(&mut self, id: u32, effects: &mut EffectsScheduler) -> Option<Pickup> {
        let index = self.pickups.iter().position(|pickup| pickup.id == id)?;
        let pickup = self.pickups.remove(index);
        effects.unregister(pickup.effect);
        self.scene.push(SceneEvent::PickupRemoved { id });
        Some(pickup)
    }

    /// Collects every pickup within `radius` of `position` that `weapons`
    /// can take. Swapping out the held weapon only happens with `allow_swap`;
    /// the swapped weapon is left behind at `position`.
    pub fn collect_near(
        &mut self,
        position: Vec3,
        radius: f32,
        weapons: &mut WeaponSystem,
        effects: &mut EffectsScheduler,
        allow_swap: bool,
    ) -> Vec<Collected> {
        let in_range: Vec<u32> = self
            .pickups
            .iter()
            .filter(|pickup| pickup.position.distance(position) <= radius)
            .map(|pickup| pickup.id)
            .collect();

        let mut collected = Vec::new();
        let mut left_behind = Vec::new();

        for id in in_range {
            let Some(pickup) = self.pickups.iter().find(|pickup| pickup.id == id) else {
                continue;
            };

            let result = match pickup.kind {
                PickupKind::Weapon { kind, magazine, total } => {
                    if !allow_swap && weapons.pickup_would_replace(kind) {
                        continue;
                    }
                    weapons
                        .pick_up(kind, magazine, total)
                        .map(|outcome| Collected::Weapon {
                            pickup_id: id,
                            outcome,
                        })
                }
                PickupKind::Ammo { amount } => weapons
                    .add_reserve(amount)
                    .then_some(Collected::Ammo {
                        pickup_id: id,
                        amount,
                    }),
            };

            let Some(result) = result else {
                continue;
            };
            if let Collected::Weapon {
                outcome: PickupOutcome::Replaced { previous, .. },
                ..
            } = &result
            {
                left_behind.push(previous.clone());
            }

            self.remove(id, effects);
            collected.push(result);
        }

        for dropped in left_behind {
            self.spawn(dropped.into(), position, effects);
        }

        collected
    }
}
