use bitflags::bitflags;
use glam::Vec3;

bitflags! {
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputFlags: u16 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const FIRE = 1 << 4;
        const RELOAD = 1 << 5;
        const NEXT_WEAPON = 1 << 6;
        const PREV_WEAPON = 1 << 7;
        const DROP_WEAPON = 1 << 8;
        const INTERACT = 1 << 9;
    }
}

impl InputFlags {
    /// Flags that act once per press rather than while held.
    pub const EDGE_TRIGGERED: Self = Self::RELOAD
        .union(Self::NEXT_WEAPON)
        .union(Self::PREV_WEAPON)
        .union(Self::DROP_WEAPON)
        .union(Self::INTERACT);
}

/// One frame of player intent. `aim_rotation` is radians around Y.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub flags: InputFlags,
    pub aim_rotation: f32,
}

impl PlayerInput {
    pub fn new(flags: InputFlags, aim_rotation: f32) -> Self {
        Self {
            flags,
            aim_rotation,
        }
    }

    /// World-space movement direction on the ground plane, unit or zero.
    pub fn move_direction(&self) -> Vec3 {
        let mut direction = Vec3::ZERO;
        if self.flags.contains(InputFlags::FORWARD) {
            direction.z += 1.0;
        }
        if self.flags.contains(InputFlags::BACKWARD) {
            direction.z -= 1.0;
        }
        if self.flags.contains(InputFlags::LEFT) {
            direction.x -= 1.0;
        }
        if self.flags.contains(InputFlags::RIGHT) {
            direction.x += 1.0;
        }
        direction.normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        let input = PlayerInput::new(InputFlags::FORWARD | InputFlags::BACKWARD, 0.0);
        assert_eq!(input.move_direction(), Vec3::ZERO);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let input = PlayerInput::new(InputFlags::FORWARD | InputFlags::RIGHT, 0.0);
        assert!((input.move_direction().length() - 1.0).abs() < 1e-6);
    }
}
