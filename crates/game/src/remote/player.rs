use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::combat::Aabb;
use crate::net::PeerId;
use crate::weapon::WeaponSystem;

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Network target plus the smoothed value shown on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTransform {
    pub target_position: Vec3,
    pub target_rotation: f32,
    pub rendered_position: Vec3,
    pub rendered_rotation: f32,
}

impl RemoteTransform {
    pub fn at(position: Vec3, rotation: f32) -> Self {
        Self {
            target_position: position,
            target_rotation: rotation,
            rendered_position: position,
            rendered_rotation: rotation,
        }
    }

    pub fn set_target(&mut self, position: Vec3, rotation: f32) {
        self.target_position = position;
        self.target_rotation = rotation;
    }

    /// Closes `factor` of the remaining gap. Rotation takes the short way round.
    pub fn step(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        self.rendered_position += (self.target_position - self.rendered_position) * factor;

        let delta = wrap_angle(self.target_rotation - self.rendered_rotation);
        self.rendered_rotation = wrap_angle(self.rendered_rotation + delta * factor);
    }

    pub fn position_error(&self) -> f32 {
        self.rendered_position.distance(self.target_position)
    }

    pub fn rotation_error(&self) -> f32 {
        wrap_angle(self.target_rotation - self.rendered_rotation).abs()
    }
}

#[derive(Debug)]
pub struct RemotePlayer {
    pub id: PeerId,
    pub transform: RemoteTransform,
    pub last_update_ms: u64,
    pub health: i32,
    pub height: Option<f32>,
    pub weapons: WeaponSystem,
}

impl RemotePlayer {
    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub fn hit_box(&self, default_height: f32, half_width: f32) -> Aabb {
        let height = self.height.unwrap_or(default_height);
        Aabb::from_center_half_extents(
            self.transform.rendered_position,
            Vec3::new(half_width, height * 0.5, half_width),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_converges_without_overshoot() {
        let mut transform = RemoteTransform::at(Vec3::ZERO, 0.0);
        transform.set_target(Vec3::new(10.0, 0.0, -4.0), 1.0);

        let mut previous = transform.position_error();
        for _ in 0..30 {
            transform.step(0.3);
            let error = transform.position_error();
            assert!(error < previous);
            assert!(transform.rendered_position.x <= 10.0);
            assert!(transform.rendered_rotation <= 1.0);
            previous = error;
        }
        assert!(previous < 1e-2);
        assert!(transform.rotation_error() < 1e-3);
    }

    #[test]
    fn rotation_takes_shortest_arc() {
        let mut transform = RemoteTransform::at(Vec3::ZERO, PI - 0.1);
        transform.set_target(Vec3::ZERO, -PI + 0.1);

        transform.step(0.5);
        // Crossing the seam, not sweeping back through zero.
        assert!(transform.rendered_rotation.abs() > PI - 0.1);
        assert!(transform.rotation_error() < 0.11);
    }

    #[test]
    fn wrap_angle_range() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-0.5) + 0.5).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
    }
}
