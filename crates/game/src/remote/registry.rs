use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::RemoteConfig;
use super::player::{RemotePlayer, RemoteTransform};
use crate::combat::CollisionDetector;
use crate::event::Emitter;
use crate::hud::{NotificationIcon, Notifications};
use crate::net::{NetworkGuard, Networked, PeerId};
use crate::scene::{SceneEvent, SceneQueue};
use crate::time::Clock;
use crate::weapon::{DEFAULT_LOADOUT, WeaponKind, WeaponSystem};

/// Every remote peer currently known, keyed by peer id.
pub struct RemotePlayerRegistry {
    config: RemoteConfig,
    players: HashMap<PeerId, RemotePlayer>,
    emitter: Emitter,
    scene: SceneQueue,
    notifications: Notifications,
    clock: Rc<dyn Clock>,
    rng: StdRng,
}

impl RemotePlayerRegistry {
    pub fn new(
        config: RemoteConfig,
        emitter: Emitter,
        scene: SceneQueue,
        notifications: Notifications,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self::with_rng(
            config,
            emitter,
            scene,
            notifications,
            clock,
            StdRng::from_entropy(),
        )
    }

    pub fn with_rng(
        config: RemoteConfig,
        emitter: Emitter,
        scene: SceneQueue,
        notifications: Notifications,
        clock: Rc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        Self {
            config,
            players: HashMap::new(),
            emitter,
            scene,
            notifications,
            clock,
            rng,
        }
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, peer_id: &str) -> bool {
        self.players.contains_key(peer_id)
    }

    pub fn get(&self, peer_id: &str) -> Option<&RemotePlayer> {
        self.players.get(peer_id)
    }

    pub fn get_mut(&mut self, peer_id: &str) -> Option<&mut RemotePlayer> {
        self.players.get_mut(peer_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &RemotePlayer> {
        self.players.values()
    }

    pub fn connect(&mut self, peer_id: &str) -> bool {
        if self.players.contains_key(peer_id) {
            log::warn!("Peer {} is already connected", peer_id);
            return false;
        }

        let jitter = self.config.spawn_jitter.abs();
        let offset = Vec3::new(
            self.rng.gen_range(-jitter..=jitter),
            0.0,
            self.rng.gen_range(-jitter..=jitter),
        );
        let position = self.config.spawn_origin + offset;

        let weapons = WeaponSystem::new(
            peer_id,
            &DEFAULT_LOADOUT,
            NetworkGuard::new(self.emitter.clone()),
            self.scene.clone(),
        );

        self.players.insert(
            peer_id.to_string(),
            RemotePlayer {
                id: peer_id.to_string(),
                transform: RemoteTransform::at(position, 0.0),
                last_update_ms: self.clock.now_ms(),
                health: self.config.max_health,
                height: None,
                weapons,
            },
        );

        self.scene.push(SceneEvent::PlayerSpawned {
            peer_id: peer_id.to_string(),
            position,
        });
        self.notifications.show(
            format!("join-{}", peer_id),
            "Player joined",
            format!("{} joined the game", peer_id),
            NotificationIcon::Join,
        );
        log::info!("Peer {} joined", peer_id);
        true
    }

    pub fn disconnect(&mut self, peer_id: &str) -> bool {
        let Some(player) = self.players.remove(peer_id) else {
            log::debug!("Ignoring disconnect of unknown peer {}", peer_id);
            return false;
        };

        let kind = player.weapons.current_kind();
        if !kind.is_empty() {
            self.scene.push(SceneEvent::WeaponDetached {
                owner: player.id.clone(),
                kind,
            });
        }
        self.scene.push(SceneEvent::PlayerRemoved {
            peer_id: player.id.clone(),
        });
        self.notifications.show(
            format!("leave-{}", peer_id),
            "Player left",
            format!("{} left the game", peer_id),
            NotificationIcon::Leave,
        );
        log::info!("Peer {} left", peer_id);
        true
    }

    /// Unknown peers are created on their first position update.
    pub fn position_update(&mut self, peer_id: &str, position: Vec3, rotation: f32) {
        if !self.players.contains_key(peer_id) {
            log::debug!("Position from unseen peer {}, creating it", peer_id);
            self.connect(peer_id);
        }

        let now_ms = self.clock.now_ms();
        if let Some(player) = self.players.get_mut(peer_id) {
            player.transform.set_target(position, rotation);
            player.last_update_ms = now_ms;
        }
    }

    pub fn weapon_switch(
        &mut self,
        peer_id: &str,
        weapon_type: &str,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    ) -> bool {
        let Some((player, kind)) = self.resolve(peer_id, weapon_type) else {
            return false;
        };
        let Some(index) = player.weapons.slot_index_of(kind) else {
            log::warn!("Peer {} switched to {} it does not carry", peer_id, kind);
            return false;
        };
        player.weapons.handle_remote_event(|weapons| {
            weapons.sync_slot_ammo(index, ammo, total_ammo);
            weapons.switch_to(index)
        })
    }

    pub fn weapon_shoot(
        &mut self,
        peer_id: &str,
        position: Vec3,
        direction: Vec3,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    ) -> usize {
        let now = self.clock.now_secs();
        let Some(player) = self.players.get_mut(peer_id) else {
            log::warn!("Dropping shot from unknown peer {}", peer_id);
            return 0;
        };

        player.weapons.handle_remote_event(|weapons| {
            let spawned = weapons.fire_from(position, direction, now);
            weapons.sync_ammo(ammo, total_ammo);
            spawned
        })
    }

    /// Reported counters are applied before reload eligibility is checked.
    pub fn weapon_reload(
        &mut self,
        peer_id: &str,
        weapon_type: &str,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    ) -> bool {
        let now = self.clock.now_secs();
        let Some((player, kind)) = self.resolve(peer_id, weapon_type) else {
            return false;
        };

        player.weapons.handle_remote_event(|weapons| {
            if weapons.current_kind() != kind {
                if let Some(index) = weapons.slot_index_of(kind) {
                    weapons.switch_to(index);
                }
            }
            weapons.sync_ammo(ammo, total_ammo);
            weapons.reload(now)
        })
    }

    /// Without reported counters the replica assumes a fresh weapon.
    pub fn weapon_pickup(
        &mut self,
        peer_id: &str,
        weapon_type: &str,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    ) -> bool {
        let Some((player, kind)) = self.resolve(peer_id, weapon_type) else {
            return false;
        };

        let reported = ammo.is_some() || total_ammo.is_some();
        let stats = kind.stats();
        player
            .weapons
            .handle_remote_event(|weapons| {
                let outcome = if reported {
                    weapons.pick_up(kind, 0, 0)
                } else {
                    weapons.pick_up(kind, stats.max_magazine_size, stats.reserve)
                };
                if let Some(outcome) = &outcome {
                    weapons.sync_slot_ammo(outcome.index(), ammo, total_ammo);
                }
                outcome
            })
            .is_some()
    }

    pub fn weapon_drop(
        &mut self,
        peer_id: &str,
        weapon_type: &str,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    ) -> bool {
        let Some((player, kind)) = self.resolve(peer_id, weapon_type) else {
            return false;
        };
        let Some(index) = player.weapons.slot_index_of(kind) else {
            log::debug!("Peer {} dropped {} it does not carry", peer_id, kind);
            return false;
        };

        player
            .weapons
            .handle_remote_event(|weapons| {
                weapons.switch_to(index);
                weapons.sync_ammo(ammo, total_ammo);
                weapons.drop_current()
            })
            .is_some()
    }

    fn resolve(&mut self, peer_id: &str, weapon_type: &str) -> Option<(&mut RemotePlayer, WeaponKind)> {
        let Some(kind) = WeaponKind::from_name(weapon_type) else {
            log::warn!("Peer {} sent unknown weapon `{}`", peer_id, weapon_type);
            return None;
        };
        match self.players.get_mut(peer_id) {
            Some(player) => Some((player, kind)),
            None => {
                log::warn!("Weapon event from unknown peer {}", peer_id);
                None
            }
        }
    }

    /// Smooths every remote transform and advances its bullets against
    /// `detector`. Returns impact points.
    pub fn update(&mut self, delta: f32, detector: &mut dyn CollisionDetector) -> Vec<Vec3> {
        let now = self.clock.now_secs();
        let factor = self.config.interpolation_factor;
        let mut impacts = Vec::new();

        for player in self.players.values_mut() {
            player.transform.step(factor);
            player.weapons.place_model(
                player.transform.rendered_position,
                player.transform.rendered_rotation,
            );
            player.weapons.poll_reload(now);

            detector.attribute_to(&player.id);
            impacts.extend(player.weapons.update_bullets(delta, detector));
        }

        impacts
    }

    /// Returns the new health, or `None` for an unknown peer.
    pub fn take_damage(&mut self, peer_id: &str, amount: i32) -> Option<i32> {
        let max_health = self.config.max_health;
        let player = self.players.get_mut(peer_id)?;

        let was_alive = !player.is_dead();
        player.health = (player.health - amount).clamp(0, max_health);

        self.notifications.show(
            format!("hit-{}", peer_id),
            "Hit",
            format!("{} took {} damage", peer_id, amount),
            NotificationIcon::Hit,
        );
        if was_alive && player.is_dead() {
            self.notifications.show(
                format!("death-{}", peer_id),
                "Eliminated",
                format!("{} was eliminated", peer_id),
                NotificationIcon::Death,
            );
        }

        Some(player.health)
    }

    /// Damages at most one player whose hit box contains `position`.
    pub fn check_bullet_collision(&mut self, position: Vec3) -> Option<PeerId> {
        let default_height = self.config.default_player_height;
        let half_width = self.config.player_half_width;

        let hit = self
            .players
            .values()
            .find(|player| player.hit_box(default_height, half_width).contains(position))
            .map(|player| player.id.clone())?;

        self.take_damage(&hit, self.config.bullet_damage);
        Some(hit)
    }
}

impl CollisionDetector for RemotePlayerRegistry {
    fn check_for_bullet_collision(&mut self, position: Vec3) -> bool {
        self.check_bullet_collision(position).is_some()
    }
}
