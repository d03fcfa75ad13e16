use glam::Vec3;

use crate::combat::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    Car,
    Crate,
    Tree,
    Cone,
    Wall,
}

impl PropKind {
    pub fn name(&self) -> &'static str {
        match self {
            PropKind::Car => "car",
            PropKind::Crate => "crate",
            PropKind::Tree => "tree",
            PropKind::Cone => "cone",
            PropKind::Wall => "wall",
        }
    }
}

/// Static obstacle. Positions are box centres.
#[derive(Debug, Clone)]
pub struct Prop {
    pub kind: PropKind,
    pub position: Vec3,
    pub half_extents: Vec3,
    pub rotation: f32,
}

impl Prop {
    pub fn car(position: Vec3, rotation: f32) -> Self {
        // Long axis follows the rotation; the box stays axis-aligned.
        let along_x = rotation.sin().abs() > rotation.cos().abs();
        let half_extents = if along_x {
            Vec3::new(2.2, 0.75, 1.0)
        } else {
            Vec3::new(1.0, 0.75, 2.2)
        };
        Self {
            kind: PropKind::Car,
            position: Vec3::new(position.x, half_extents.y, position.z),
            half_extents,
            rotation,
        }
    }

    pub fn crate_box(position: Vec3, size: f32) -> Self {
        let half = size * 0.5;
        Self {
            kind: PropKind::Crate,
            position: Vec3::new(position.x, half, position.z),
            half_extents: Vec3::splat(half),
            rotation: 0.0,
        }
    }

    /// Only the trunk blocks bullets.
    pub fn tree(position: Vec3) -> Self {
        Self {
            kind: PropKind::Tree,
            position: Vec3::new(position.x, 1.5, position.z),
            half_extents: Vec3::new(0.3, 1.5, 0.3),
            rotation: 0.0,
        }
    }

    pub fn cone(position: Vec3) -> Self {
        Self {
            kind: PropKind::Cone,
            position: Vec3::new(position.x, 0.35, position.z),
            half_extents: Vec3::new(0.25, 0.35, 0.25),
            rotation: 0.0,
        }
    }

    pub fn wall(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            kind: PropKind::Wall,
            position: Vec3::new(position.x, half_extents.y, position.z),
            half_extents,
            rotation: 0.0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.bounds().contains(point)
    }
}
