use glam::{Quat, Vec3};

use super::kind::WeaponKind;

/// Angle between shotgun pellets, in radians around the vertical axis.
pub const SHOTGUN_SPREAD: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub remaining_lifetime: f32,
}

impl Bullet {
    pub fn new(position: Vec3, direction: Vec3, speed: f32, lifetime: f32) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
            speed,
            remaining_lifetime: lifetime,
        }
    }

    /// Moves the bullet and returns whether it is still alive.
    pub fn advance(&mut self, delta: f32) -> bool {
        self.position += self.direction * self.speed * delta;
        self.remaining_lifetime -= delta;
        self.remaining_lifetime > 0.0
    }
}

pub fn spread_directions(kind: WeaponKind, direction: Vec3) -> Vec<Vec3> {
    let pellets = kind.stats().pellets;
    if pellets <= 1 {
        return vec![direction];
    }

    let half = (pellets - 1) as f32 / 2.0;
    (0..pellets)
        .map(|i| {
            let angle = (i as f32 - half) * SHOTGUN_SPREAD;
            Quat::from_rotation_y(angle) * direction
        })
        .collect()
}

pub fn spawn_bullets(kind: WeaponKind, origin: Vec3, direction: Vec3) -> Vec<Bullet> {
    let stats = kind.stats();
    spread_directions(kind, direction)
        .into_iter()
        .map(|dir| Bullet::new(origin, dir, stats.bullet_speed, stats.bullet_lifetime))
        .collect()
}
