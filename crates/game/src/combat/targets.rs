use glam::Vec3;

use super::{Aabb, CollisionDetector};
use crate::map::Arena;
use crate::net::PeerId;
use crate::player::LocalPlayer;
use crate::remote::RemotePlayerRegistry;

/// Targets for bullets fired by the local player: props first, then remote
/// players, who take damage on contact.
pub struct LocalShotTargets<'a> {
    arena: &'a Arena,
    remotes: &'a mut RemotePlayerRegistry,
    hits: Vec<(PeerId, Vec3)>,
}

impl<'a> LocalShotTargets<'a> {
    pub fn new(arena: &'a Arena, remotes: &'a mut RemotePlayerRegistry) -> Self {
        Self {
            arena,
            remotes,
            hits: Vec::new(),
        }
    }

    pub fn into_hits(self) -> Vec<(PeerId, Vec3)> {
        self.hits
    }
}

impl CollisionDetector for LocalShotTargets<'_> {
    fn check_for_bullet_collision(&mut self, position: Vec3) -> bool {
        if self.arena.prop_at(position).is_some() {
            return true;
        }
        match self.remotes.check_bullet_collision(position) {
            Some(peer_id) => {
                self.hits.push((peer_id, position));
                true
            }
            None => false,
        }
    }
}

/// Targets for replicated remote bullets: props and the local player.
pub struct IncomingShotTargets<'a> {
    arena: &'a Arena,
    player: &'a mut LocalPlayer,
    half_width: f32,
    damage: i32,
    shooter: String,
}

impl<'a> IncomingShotTargets<'a> {
    pub fn new(arena: &'a Arena, player: &'a mut LocalPlayer, half_width: f32, damage: i32) -> Self {
        Self {
            arena,
            player,
            half_width,
            damage,
            shooter: String::new(),
        }
    }

    fn player_box(&self) -> Aabb {
        let height = self.player.height();
        Aabb::from_center_half_extents(
            self.player.position(),
            Vec3::new(self.half_width, height * 0.5, self.half_width),
        )
    }
}

impl CollisionDetector for IncomingShotTargets<'_> {
    fn check_for_bullet_collision(&mut self, position: Vec3) -> bool {
        if self.arena.prop_at(position).is_some() {
            return true;
        }
        if self.player.is_dead() || !self.player_box().contains(position) {
            return false;
        }

        self.player.take_damage(&self.shooter, self.damage, None);
        true
    }

    fn attribute_to(&mut self, owner: &str) {
        self.shooter = owner.to_string();
    }
}
