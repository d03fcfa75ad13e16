use glam::Vec3;

use crate::combat::BULLET_DAMAGE;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Fraction of the remaining gap closed each frame.
    pub interpolation_factor: f32,
    pub default_player_height: f32,
    pub player_half_width: f32,
    pub bullet_damage: i32,
    pub max_health: i32,
    pub spawn_origin: Vec3,
    pub spawn_jitter: f32,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            interpolation_factor: 0.3,
            default_player_height: 2.0,
            player_half_width: 0.5,
            bullet_damage: BULLET_DAMAGE,
            max_health: 100,
            spawn_origin: Vec3::new(0.0, 1.0, 0.0),
            spawn_jitter: 5.0,
        }
    }
}
