use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::net::protocol;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WireVec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WireVec3 {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vec3> for WireVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<WireVec3> for Vec3 {
    fn from(v: WireVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponAction {
    Shoot,
    Reload,
    Switch,
    Pickup,
    Drop,
}

impl WeaponAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shoot => "shoot",
            Self::Reload => "reload",
            Self::Switch => "switch",
            Self::Pickup => "pickup",
            Self::Drop => "drop",
        }
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Shoot => protocol::WEAPON_SHOOT,
            Self::Reload => protocol::WEAPON_RELOAD,
            Self::Switch => protocol::WEAPON_SWITCH,
            Self::Pickup => protocol::WEAPON_PICKUP,
            Self::Drop => protocol::WEAPON_DROP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatKind {
    Hit,
    Damage,
    Kill,
}

impl CombatKind {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Hit => protocol::COMBAT_HIT,
            Self::Damage => protocol::COMBAT_DAMAGE,
            Self::Kill => protocol::COMBAT_KILL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEvent {
    pub position: WireVec3,
    pub rotation: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponEventData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammo: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_ammo: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<WireVec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<WireVec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponEvent {
    pub weapon_type: String,
    pub action: WeaponAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<WeaponEventData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatEvent {
    #[serde(rename = "type")]
    pub kind: CombatKind,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<WireVec3>,
}

/// Locally produced event. The wire timestamp is attached by the outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameEvent {
    Position(PositionEvent),
    Weapon(WeaponEvent),
    Combat(CombatEvent),
}

impl GameEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Position(_) => protocol::PLAYER_POSITION,
            Self::Weapon(weapon) => weapon.action.event_name(),
            Self::Combat(combat) => combat.kind.event_name(),
        }
    }
}

impl From<PositionEvent> for GameEvent {
    fn from(event: PositionEvent) -> Self {
        Self::Position(event)
    }
}

impl From<WeaponEvent> for GameEvent {
    fn from(event: WeaponEvent) -> Self {
        Self::Weapon(event)
    }
}

impl From<CombatEvent> for GameEvent {
    fn from(event: CombatEvent) -> Self {
        Self::Combat(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_event_uses_wire_field_names() {
        let event = WeaponEvent {
            weapon_type: "pistol".to_string(),
            action: WeaponAction::Shoot,
            data: Some(WeaponEventData {
                ammo: Some(11),
                total_ammo: Some(120),
                position: Some(Vec3::new(1.0, 2.0, 3.0).into()),
                direction: None,
            }),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["weaponType"], "pistol");
        assert_eq!(value["action"], "shoot");
        assert_eq!(value["data"]["totalAmmo"], 120);
        assert_eq!(value["data"]["position"]["z"], 3.0);
        assert!(value["data"].get("direction").is_none());
    }

    #[test]
    fn event_names_follow_kind() {
        let switch = GameEvent::from(WeaponEvent {
            weapon_type: "rifle".to_string(),
            action: WeaponAction::Switch,
            data: None,
        });
        assert_eq!(switch.event_name(), "weapon.switch");

        let kill = GameEvent::from(CombatEvent {
            kind: CombatKind::Kill,
            source_id: "a".to_string(),
            target_id: "b".to_string(),
            damage: None,
            weapon_type: None,
            position: None,
        });
        assert_eq!(kill.event_name(), "combat.kill");

        let combat = serde_json::to_value(&kill).unwrap();
        assert_eq!(combat["type"], "kill");
        assert_eq!(combat["sourceId"], "a");
    }
}
