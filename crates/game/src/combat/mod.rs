mod targets;

use glam::Vec3;

pub use targets::{IncomingShotTargets, LocalShotTargets};

pub const BULLET_DAMAGE: i32 = 25;

/// Hit test consulted once per live bullet per frame. A positive answer ends
/// the bullet and may already have applied damage to whatever was hit.
pub trait CollisionDetector {
    fn check_for_bullet_collision(&mut self, position: Vec3) -> bool;

    /// Names the shooter whose bullets are about to be tested.
    fn attribute_to(&mut self, _owner: &str) {}
}

impl<F: FnMut(Vec3) -> bool> CollisionDetector for F {
    fn check_for_bullet_collision(&mut self, position: Vec3) -> bool {
        self(position)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCollision;

impl CollisionDetector for NoCollision {
    fn check_for_bullet_collision(&mut self, _position: Vec3) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_contains_is_inclusive() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE);
        assert!(aabb.contains(Vec3::ZERO));
        assert!(aabb.contains(Vec3::new(1.0, -1.0, 1.0)));
        assert!(!aabb.contains(Vec3::new(1.01, 0.0, 0.0)));
    }

    #[test]
    fn closures_act_as_detectors() {
        let mut calls = 0;
        let mut detector = |p: Vec3| {
            calls += 1;
            p.x > 1.0
        };
        assert!(!detector.check_for_bullet_collision(Vec3::ZERO));
        assert!(detector.check_for_bullet_collision(Vec3::X * 2.0));
        assert_eq!(calls, 2);
    }
}
