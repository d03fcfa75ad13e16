use glam::Vec3;

use super::{Prop, PropKind};
use crate::combat::CollisionDetector;
use crate::pickup::PickupKind;

/// The static play area: ground bounds, obstacles and ammo crate spots.
pub struct Arena {
    half_size: f32,
    props: Vec<Prop>,
    ammo_spawns: Vec<(Vec3, PickupKind)>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl Arena {
    const HALF_SIZE: f32 = 40.0;
    const WALL_HEIGHT: f32 = 3.0;
    const WALL_THICKNESS: f32 = 0.5;

    pub fn new() -> Self {
        let mut props = Vec::new();

        Self::add_boundary_walls(&mut props, Self::HALF_SIZE);
        Self::add_parking_lot(&mut props);
        Self::add_crate_stacks(&mut props);
        Self::add_trees(&mut props);
        Self::add_cone_line(&mut props);

        let ammo_spawns = vec![
            (Vec3::new(-12.0, 0.5, -12.0), PickupKind::Ammo { amount: 30 }),
            (Vec3::new(12.0, 0.5, 12.0), PickupKind::Ammo { amount: 30 }),
            (Vec3::new(-20.0, 0.5, 18.0), PickupKind::Ammo { amount: 60 }),
        ];

        Self {
            half_size: Self::HALF_SIZE,
            props,
            ammo_spawns,
        }
    }

    /// A bare square with no obstacles.
    pub fn empty(half_size: f32) -> Self {
        Self {
            half_size,
            props: Vec::new(),
            ammo_spawns: Vec::new(),
        }
    }

    pub fn with_prop(mut self, prop: Prop) -> Self {
        self.props.push(prop);
        self
    }

    fn add_boundary_walls(props: &mut Vec<Prop>, half_size: f32) {
        let height = Self::WALL_HEIGHT * 0.5;
        let thickness = Self::WALL_THICKNESS;
        let span = half_size + thickness;

        props.push(Prop::wall(
            Vec3::new(0.0, 0.0, span),
            Vec3::new(span, height, thickness),
        ));
        props.push(Prop::wall(
            Vec3::new(0.0, 0.0, -span),
            Vec3::new(span, height, thickness),
        ));
        props.push(Prop::wall(
            Vec3::new(span, 0.0, 0.0),
            Vec3::new(thickness, height, span),
        ));
        props.push(Prop::wall(
            Vec3::new(-span, 0.0, 0.0),
            Vec3::new(thickness, height, span),
        ));
    }

    fn add_parking_lot(props: &mut Vec<Prop>) {
        for i in 0..4 {
            let x = -15.0 + i as f32 * 4.0;
            props.push(Prop::car(Vec3::new(x, 0.0, 20.0), 0.0));
        }
        props.push(Prop::car(Vec3::new(10.0, 0.0, -6.0), std::f32::consts::FRAC_PI_2));
    }

    fn add_crate_stacks(props: &mut Vec<Prop>) {
        let crates = [
            (Vec3::new(6.0, 0.0, 6.0), 1.2),
            (Vec3::new(7.4, 0.0, 6.0), 1.2),
            (Vec3::new(-8.0, 0.0, -4.0), 1.5),
            (Vec3::new(18.0, 0.0, -18.0), 1.0),
        ];
        for (position, size) in crates {
            props.push(Prop::crate_box(position, size));
        }
    }

    fn add_trees(props: &mut Vec<Prop>) {
        for i in 0..6 {
            let angle = i as f32 * std::f32::consts::TAU / 6.0;
            let position = Vec3::new(angle.cos() * 28.0, 0.0, angle.sin() * 28.0);
            props.push(Prop::tree(position));
        }
    }

    fn add_cone_line(props: &mut Vec<Prop>) {
        for i in 0..5 {
            props.push(Prop::cone(Vec3::new(-4.0 + i as f32 * 2.0, 0.0, -14.0)));
        }
    }

    pub fn half_size(&self) -> f32 {
        self.half_size
    }

    pub fn props(&self) -> &[Prop] {
        &self.props
    }

    pub fn props_of(&self, kind: PropKind) -> impl Iterator<Item = &Prop> {
        self.props.iter().filter(move |prop| prop.kind == kind)
    }

    pub fn ammo_spawns(&self) -> &[(Vec3, PickupKind)] {
        &self.ammo_spawns
    }

    pub fn prop_at(&self, point: Vec3) -> Option<&Prop> {
        self.props.iter().find(|prop| prop.contains(point))
    }

    /// Keeps a position on the ground square.
    pub fn clamp_to_bounds(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(-self.half_size, self.half_size),
            position.y,
            position.z.clamp(-self.half_size, self.half_size),
        )
    }
}

impl CollisionDetector for Arena {
    fn check_for_bullet_collision(&mut self, position: Vec3) -> bool {
        self.prop_at(position).is_some()
    }
}
