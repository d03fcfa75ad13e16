use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    Empty,
    Pistol,
    Rifle,
    Shotgun,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub max_magazine_size: u32,
    pub reserve: u32,
    /// Minimum seconds between shots.
    pub fire_rate: f64,
    pub reload_duration: f64,
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub pellets: u32,
}

pub const DEFAULT_LOADOUT: [WeaponKind; 3] =
    [WeaponKind::Pistol, WeaponKind::Rifle, WeaponKind::Shotgun];

impl WeaponKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Pistol => "pistol",
            Self::Rifle => "rifle",
            Self::Shotgun => "shotgun",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "empty" => Some(Self::Empty),
            "pistol" => Some(Self::Pistol),
            "rifle" => Some(Self::Rifle),
            "shotgun" => Some(Self::Shotgun),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn stats(&self) -> WeaponStats {
        match self {
            Self::Empty => WeaponStats {
                max_magazine_size: 0,
                reserve: 0,
                fire_rate: 0.0,
                reload_duration: 0.0,
                bullet_speed: 0.0,
                bullet_lifetime: 0.0,
                pellets: 0,
            },
            Self::Pistol => WeaponStats {
                max_magazine_size: 12,
                reserve: 120,
                fire_rate: 0.25,
                reload_duration: 1.5,
                bullet_speed: 30.0,
                bullet_lifetime: 2.0,
                pellets: 1,
            },
            Self::Rifle => WeaponStats {
                max_magazine_size: 30,
                reserve: 180,
                fire_rate: 0.1,
                reload_duration: 2.0,
                bullet_speed: 40.0,
                bullet_lifetime: 2.0,
                pellets: 1,
            },
            Self::Shotgun => WeaponStats {
                max_magazine_size: 6,
                reserve: 36,
                fire_rate: 0.8,
                reload_duration: 2.5,
                bullet_speed: 25.0,
                bullet_lifetime: 1.0,
                pellets: 3,
            },
        }
    }
}

impl std::fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip() {
        for kind in [
            WeaponKind::Empty,
            WeaponKind::Pistol,
            WeaponKind::Rifle,
            WeaponKind::Shotgun,
        ] {
            assert_eq!(WeaponKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(WeaponKind::from_name("railgun"), None);
    }

    #[test]
    fn empty_sentinel_has_no_capacity() {
        let stats = WeaponKind::Empty.stats();
        assert_eq!(stats.max_magazine_size, 0);
        assert_eq!(stats.pellets, 0);
    }
}
