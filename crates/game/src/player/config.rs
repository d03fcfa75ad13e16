use glam::Vec3;

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub move_speed: f32,
    pub player_height: f32,
    pub max_health: i32,
    pub pickup_radius: f32,
    pub spawn_position: Vec3,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            player_height: 2.0,
            max_health: 100,
            pickup_radius: 1.5,
            spawn_position: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}
