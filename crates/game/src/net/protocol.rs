use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{CombatEvent, WeaponAction, WeaponEventData, WireVec3};

pub const USER_CONNECTED: &str = "user.connected";
pub const USER_DISCONNECTED: &str = "user.disconnected";
pub const USER_WELCOME: &str = "user.welcome";
pub const PLAYER_POSITION: &str = "player.position";
pub const WEAPON_SHOOT: &str = "weapon.shoot";
pub const WEAPON_SWITCH: &str = "weapon.switch";
pub const WEAPON_RELOAD: &str = "weapon.reload";
pub const WEAPON_PICKUP: &str = "weapon.pickup";
pub const WEAPON_DROP: &str = "weapon.drop";
pub const COMBAT_HIT: &str = "combat.hit";
pub const COMBAT_DAMAGE: &str = "combat.damage";
pub const COMBAT_KILL: &str = "combat.kill";

pub const USER_ID_FIELD: &str = "userId";

pub type PeerId = String;

#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Welcome {
        peer_id: PeerId,
    },
    Connected {
        peer_id: PeerId,
    },
    Disconnected {
        peer_id: PeerId,
    },
    Position {
        peer_id: PeerId,
        position: Vec3,
        rotation: f32,
    },
    WeaponSwitch {
        peer_id: PeerId,
        weapon_type: String,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    },
    WeaponShoot {
        peer_id: PeerId,
        position: Vec3,
        direction: Vec3,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    },
    WeaponReload {
        peer_id: PeerId,
        weapon_type: String,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    },
    WeaponPickup {
        peer_id: PeerId,
        weapon_type: String,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    },
    WeaponDrop {
        peer_id: PeerId,
        weapon_type: String,
        ammo: Option<u32>,
        total_ammo: Option<u32>,
    },
    Combat {
        peer_id: PeerId,
        event: CombatEvent,
    },
}

impl InboundEvent {
    pub fn peer_id(&self) -> &str {
        match self {
            Self::Welcome { peer_id }
            | Self::Connected { peer_id }
            | Self::Disconnected { peer_id }
            | Self::Position { peer_id, .. }
            | Self::WeaponSwitch { peer_id, .. }
            | Self::WeaponShoot { peer_id, .. }
            | Self::WeaponReload { peer_id, .. }
            | Self::WeaponPickup { peer_id, .. }
            | Self::WeaponDrop { peer_id, .. }
            | Self::Combat { peer_id, .. } => peer_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DropReason {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("malformed `{event}` payload: {reason}")]
    Malformed { event: String, reason: String },
    #[error("`{event}` is missing `{field}`")]
    MissingField { event: String, field: &'static str },
    #[error("`{event}` carries action `{found}`, expected `{expected}`")]
    ActionMismatch {
        event: String,
        found: String,
        expected: &'static str,
    },
    #[error("`{event}` has an unusable vector in `{field}`")]
    InvalidVector { event: String, field: &'static str },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPayload {
    user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionPayload {
    user_id: String,
    position: WireVec3,
    rotation: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeaponPayload {
    user_id: String,
    weapon_type: String,
    action: WeaponAction,
    #[serde(default)]
    data: Option<WeaponEventData>,
}

impl WeaponPayload {
    fn ammo(&self) -> (Option<u32>, Option<u32>) {
        match &self.data {
            Some(data) => (data.ammo, data.total_ammo),
            None => (None, None),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShootData {
    position: Option<WireVec3>,
    direction: Option<WireVec3>,
    ammo: Option<u32>,
    total_ammo: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShootPayload {
    user_id: String,
    #[serde(default)]
    data: Option<ShootData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CombatPayload {
    user_id: String,
    #[serde(flatten)]
    event: CombatEvent,
}

/// Decodes one inbound delivery. A flushed batch arrives as an array and
/// yields one result per element, so a single bad element does not poison
/// the rest of the batch.
pub fn decode(event_name: &str, payload: &Value) -> Vec<Result<InboundEvent, DropReason>> {
    match payload {
        Value::Array(items) => items
            .iter()
            .map(|item| decode_one(event_name, item))
            .collect(),
        other => vec![decode_one(event_name, other)],
    }
}

pub fn decode_one(event_name: &str, payload: &Value) -> Result<InboundEvent, DropReason> {
    match event_name {
        USER_WELCOME => {
            let p: UserPayload = parse(event_name, payload)?;
            Ok(InboundEvent::Welcome { peer_id: p.user_id })
        }
        USER_CONNECTED => {
            let p: UserPayload = parse(event_name, payload)?;
            Ok(InboundEvent::Connected { peer_id: p.user_id })
        }
        USER_DISCONNECTED => {
            let p: UserPayload = parse(event_name, payload)?;
            Ok(InboundEvent::Disconnected { peer_id: p.user_id })
        }
        PLAYER_POSITION => {
            let p: PositionPayload = parse(event_name, payload)?;
            if !p.position.is_finite() {
                return Err(DropReason::InvalidVector {
                    event: event_name.to_string(),
                    field: "position",
                });
            }
            if !p.rotation.is_finite() {
                return Err(DropReason::Malformed {
                    event: event_name.to_string(),
                    reason: "rotation is not finite".to_string(),
                });
            }
            Ok(InboundEvent::Position {
                peer_id: p.user_id,
                position: p.position.into(),
                rotation: p.rotation,
            })
        }
        WEAPON_SHOOT => decode_shoot(event_name, payload),
        WEAPON_SWITCH => {
            let p = parse_weapon(event_name, payload, WeaponAction::Switch)?;
            let (ammo, total_ammo) = p.ammo();
            Ok(InboundEvent::WeaponSwitch {
                peer_id: p.user_id,
                weapon_type: p.weapon_type,
                ammo,
                total_ammo,
            })
        }
        WEAPON_RELOAD => {
            let p = parse_weapon(event_name, payload, WeaponAction::Reload)?;
            let (ammo, total_ammo) = p.ammo();
            Ok(InboundEvent::WeaponReload {
                peer_id: p.user_id,
                weapon_type: p.weapon_type,
                ammo,
                total_ammo,
            })
        }
        WEAPON_PICKUP => {
            let p = parse_weapon(event_name, payload, WeaponAction::Pickup)?;
            let (ammo, total_ammo) = p.ammo();
            Ok(InboundEvent::WeaponPickup {
                peer_id: p.user_id,
                weapon_type: p.weapon_type,
                ammo,
                total_ammo,
            })
        }
        WEAPON_DROP => {
            let p = parse_weapon(event_name, payload, WeaponAction::Drop)?;
            let (ammo, total_ammo) = p.ammo();
            Ok(InboundEvent::WeaponDrop {
                peer_id: p.user_id,
                weapon_type: p.weapon_type,
                ammo,
                total_ammo,
            })
        }
        COMBAT_HIT | COMBAT_DAMAGE | COMBAT_KILL => {
            let p: CombatPayload = parse(event_name, payload)?;
            Ok(InboundEvent::Combat {
                peer_id: p.user_id,
                event: p.event,
            })
        }
        other => Err(DropReason::UnknownEvent(other.to_string())),
    }
}

fn decode_shoot(event_name: &str, payload: &Value) -> Result<InboundEvent, DropReason> {
    let p: ShootPayload = parse(event_name, payload)?;
    let data = p.data.unwrap_or_default();

    let position = data.position.ok_or_else(|| DropReason::MissingField {
        event: event_name.to_string(),
        field: "data.position",
    })?;
    let direction = data.direction.ok_or_else(|| DropReason::MissingField {
        event: event_name.to_string(),
        field: "data.direction",
    })?;

    if !position.is_finite() {
        return Err(DropReason::InvalidVector {
            event: event_name.to_string(),
            field: "data.position",
        });
    }

    let direction = Vec3::from(direction);
    if !direction.is_finite() || direction.length_squared() < 1e-8 {
        return Err(DropReason::InvalidVector {
            event: event_name.to_string(),
            field: "data.direction",
        });
    }

    Ok(InboundEvent::WeaponShoot {
        peer_id: p.user_id,
        position: position.into(),
        direction: direction.normalize(),
        ammo: data.ammo,
        total_ammo: data.total_ammo,
    })
}

fn parse_weapon(
    event_name: &str,
    payload: &Value,
    expected: WeaponAction,
) -> Result<WeaponPayload, DropReason> {
    let p: WeaponPayload = parse(event_name, payload)?;
    if p.action != expected {
        return Err(DropReason::ActionMismatch {
            event: event_name.to_string(),
            found: p.action.as_str().to_string(),
            expected: expected.as_str(),
        });
    }
    Ok(p)
}

fn parse<T: DeserializeOwned>(event_name: &str, payload: &Value) -> Result<T, DropReason> {
    T::deserialize(payload).map_err(|e| DropReason::Malformed {
        event: event_name.to_string(),
        reason: e.to_string(),
    })
}

/// Attaches the sender id to an outbound payload, element-wise for batches.
pub fn stamp_sender(payload: Value, user_id: &str) -> Value {
    match payload {
        Value::Object(mut map) => {
            map.insert(USER_ID_FIELD.to_string(), Value::from(user_id));
            Value::Object(map)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| stamp_sender(item, user_id))
                .collect(),
        ),
        other => other,
    }
}

/// Text frame exchanged with the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub event: String,
    pub payload: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("invalid frame: {0}")]
    Json(#[from] serde_json::Error),
}

impl WireMessage {
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    pub fn encode(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn shoot_without_direction_is_dropped() {
        let payload = json!({
            "userId": "peer-1",
            "data": { "position": { "x": 0.0, "y": 1.0, "z": 0.0 } }
        });

        let result = decode_one(WEAPON_SHOOT, &payload);
        assert_eq!(
            result,
            Err(DropReason::MissingField {
                event: WEAPON_SHOOT.to_string(),
                field: "data.direction",
            })
        );
    }

    #[test]
    fn shoot_direction_is_normalized() {
        let payload = json!({
            "userId": "peer-1",
            "data": {
                "position": { "x": 1.0, "y": 1.0, "z": 1.0 },
                "direction": { "x": 0.0, "y": 0.0, "z": 4.0 },
                "ammo": 3
            }
        });

        match decode_one(WEAPON_SHOOT, &payload) {
            Ok(InboundEvent::WeaponShoot {
                direction, ammo, ..
            }) => {
                assert!((direction - Vec3::Z).length() < 1e-6);
                assert_eq!(ammo, Some(3));
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn batches_decode_element_wise() {
        let payload = json!([
            { "userId": "a", "position": { "x": 1.0, "y": 0.0, "z": 0.0 }, "rotation": 0.0 },
            { "userId": "a", "rotation": 0.0 },
            { "userId": "a", "position": { "x": 2.0, "y": 0.0, "z": 0.0 }, "rotation": 0.5 }
        ]);

        let results = decode(PLAYER_POSITION, &payload);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(DropReason::Malformed { .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn switch_with_wrong_action_is_rejected() {
        let payload = json!({ "userId": "a", "weaponType": "rifle", "action": "reload" });
        assert!(matches!(
            decode_one(WEAPON_SWITCH, &payload),
            Err(DropReason::ActionMismatch { .. })
        ));
    }

    #[test]
    fn weapon_events_carry_reported_ammo() {
        let payload = json!({
            "userId": "a",
            "weaponType": "rifle",
            "action": "pickup",
            "data": { "ammo": 7, "totalAmmo": 42 }
        });
        assert_eq!(
            decode_one(WEAPON_PICKUP, &payload),
            Ok(InboundEvent::WeaponPickup {
                peer_id: "a".to_string(),
                weapon_type: "rifle".to_string(),
                ammo: Some(7),
                total_ammo: Some(42),
            })
        );

        let bare = json!({ "userId": "a", "weaponType": "rifle", "action": "drop" });
        match decode_one(WEAPON_DROP, &bare) {
            Ok(InboundEvent::WeaponDrop {
                ammo, total_ammo, ..
            }) => assert_eq!((ammo, total_ammo), (None, None)),
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn unknown_events_are_reported() {
        assert_eq!(
            decode_one("chat.message", &json!({})),
            Err(DropReason::UnknownEvent("chat.message".to_string()))
        );
    }

    #[test]
    fn combat_payload_flattens_event_fields() {
        let payload = json!({
            "userId": "a",
            "type": "kill",
            "sourceId": "a",
            "targetId": "b",
            "timestamp": 10
        });

        match decode_one(COMBAT_KILL, &payload) {
            Ok(InboundEvent::Combat { peer_id, event }) => {
                assert_eq!(peer_id, "a");
                assert_eq!(event.target_id, "b");
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn sender_is_stamped_on_every_batch_element() {
        let stamped = stamp_sender(json!([{ "a": 1 }, { "a": 2 }]), "peer-9");
        for item in stamped.as_array().unwrap() {
            assert_eq!(item["userId"], "peer-9");
        }
    }

    #[test]
    fn wire_message_roundtrip() {
        let message = WireMessage::new(PLAYER_POSITION, json!({ "rotation": 1.0 }));
        let text = message.encode().unwrap();
        assert_eq!(WireMessage::decode(&text).unwrap(), message);
        assert!(WireMessage::decode("not json").is_err());
    }
}
